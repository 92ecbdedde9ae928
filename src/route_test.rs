use super::*;

// =============================================================================
// screen groups
// =============================================================================

#[test]
fn auth_flow_screens_are_unauthenticated_group() {
    for screen in [
        Screen::SignIn,
        Screen::SignUp,
        Screen::PreSignUp,
        Screen::ForgotPassword,
        Screen::ResetPassword,
        Screen::EmailConfirmed,
    ] {
        assert_eq!(screen.group(), ScreenGroup::Unauthenticated, "screen: {screen:?}");
    }
}

#[test]
fn main_screens_are_main_group() {
    for screen in [Screen::Home, Screen::AddReturn, Screen::ReturnDetails] {
        assert_eq!(screen.group(), ScreenGroup::Main, "screen: {screen:?}");
    }
}

#[test]
fn profile_completion_and_onboarding_have_own_groups() {
    assert_eq!(Screen::ProfileCompletion.group(), ScreenGroup::ProfileCompletion);
    assert_eq!(Screen::Onboarding.group(), ScreenGroup::Onboarding);
}

// =============================================================================
// route → screen mapping
// =============================================================================

#[test]
fn route_screen_targets() {
    assert_eq!(Route::SignIn(SignInParams::default()).screen(), Screen::SignIn);
    assert_eq!(Route::ResetPassword { token: None }.screen(), Screen::ResetPassword);
    assert_eq!(Route::ProfileCompletion.screen(), Screen::ProfileCompletion);
    assert_eq!(Route::Onboarding.screen(), Screen::Onboarding);
    assert_eq!(Route::MainApp.screen(), Screen::Home);
}

#[test]
fn sign_in_params_default_is_empty() {
    let params = SignInParams::default();
    assert!(!params.confirmed);
    assert!(!params.reset_success);
    assert_eq!(params.email, None);
    assert_eq!(params.invite_token, None);
    assert_eq!(params.error, None);
}

#[test]
fn screen_serializes_snake_case() {
    let json = serde_json::to_string(&Screen::ProfileCompletion).unwrap();
    assert_eq!(json, "\"profile_completion\"");
}
