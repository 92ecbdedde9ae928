use super::Navigator;
use crate::route::{Route, Screen, SignInParams};

#[test]
fn replace_delivers_route_and_moves_tracked_location() {
    let (navigator, mut routes) = Navigator::new(Screen::Home);

    navigator.replace(Route::Onboarding);

    assert_eq!(navigator.current(), Screen::Onboarding);
    assert_eq!(routes.try_recv().unwrap(), Route::Onboarding);
}

#[test]
fn main_app_route_lands_on_home() {
    let (navigator, mut routes) = Navigator::new(Screen::SignIn);

    navigator.replace(Route::MainApp);

    assert_eq!(navigator.current(), Screen::Home);
    assert_eq!(routes.try_recv().unwrap(), Route::MainApp);
}

#[test]
fn set_current_tracks_host_navigation_without_emitting() {
    let (navigator, mut routes) = Navigator::new(Screen::Home);

    navigator.set_current(Screen::AddReturn);

    assert_eq!(navigator.current(), Screen::AddReturn);
    assert!(routes.try_recv().is_err());
}

#[test]
fn clones_share_location_and_channel() {
    let (navigator, mut routes) = Navigator::new(Screen::Home);
    let other = navigator.clone();

    other.replace(Route::SignIn(SignInParams::default()));

    assert_eq!(navigator.current(), Screen::SignIn);
    assert_eq!(routes.try_recv().unwrap(), Route::SignIn(SignInParams::default()));
}

#[test]
fn poisoned_location_lock_does_not_panic() {
    let (navigator, mut routes) = Navigator::new(Screen::Home);

    let poisoner = navigator.clone();
    let _ = std::thread::spawn(move || {
        let _guard = poisoner.inner.location.lock().unwrap();
        panic!("poison the location lock");
    })
    .join();

    assert_eq!(navigator.current(), Screen::Home);
    navigator.replace(Route::Onboarding);
    assert_eq!(navigator.current(), Screen::Onboarding);
    assert_eq!(routes.try_recv().unwrap(), Route::Onboarding);
}

#[test]
fn full_channel_drops_instead_of_blocking() {
    let (navigator, mut routes) = Navigator::new(Screen::Home);

    for _ in 0..64 {
        navigator.replace(Route::Onboarding);
    }

    // Location still reflects the latest request even when the channel is full.
    assert_eq!(navigator.current(), Screen::Onboarding);
    let mut delivered = 0;
    while routes.try_recv().is_ok() {
        delivered += 1;
    }
    assert_eq!(delivered, 32);
}
