//! Route reconciliation — the screen the app should be on, given identity.
//!
//! DESIGN
//! ======
//! `reconcile` is a pure function of (snapshot, location); for fixed inputs
//! it always returns the same decision, which is what makes it safe to
//! re-invoke on every snapshot change without navigation loops. An in-flight
//! profile fetch deliberately resolves to no decision: navigating before the
//! fetch settles would flash a profile-completion redirect that is reversed
//! a moment later.

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::navigator::Navigator;
use crate::route::{Route, Screen, ScreenGroup, SignInParams};
use crate::store::IdentitySnapshot;

// =============================================================================
// PHASES
// =============================================================================

/// Exhaustive, mutually exclusive identity phases.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionPhase {
    /// No session. Terminal until a new sign-in event arrives.
    Unauthenticated,
    /// Session restore or profile fetch still in flight; hold position.
    AwaitingProfile,
    /// Fetch settled without a usable display name.
    NeedsProfile,
    /// Profile complete, onboarding not yet finished.
    NeedsOnboarding,
    /// Terminal state for the lifetime of a session.
    Ready,
}

impl SessionPhase {
    #[must_use]
    pub fn of(snapshot: &IdentitySnapshot) -> Self {
        if snapshot.loading {
            return Self::AwaitingProfile;
        }
        if !snapshot.session_present {
            return Self::Unauthenticated;
        }
        if !snapshot.has_display_name {
            return Self::NeedsProfile;
        }
        if !snapshot.onboarding_completed {
            return Self::NeedsOnboarding;
        }
        Self::Ready
    }
}

// =============================================================================
// DECISION FUNCTION
// =============================================================================

/// Map an identity snapshot and the current screen to a navigation decision.
/// `None` means stay put.
#[must_use]
pub fn reconcile(snapshot: &IdentitySnapshot, location: Screen) -> Option<Route> {
    match SessionPhase::of(snapshot) {
        SessionPhase::Unauthenticated => match location.group() {
            ScreenGroup::Unauthenticated => None,
            _ => Some(Route::SignIn(SignInParams::default())),
        },
        SessionPhase::AwaitingProfile => None,
        SessionPhase::NeedsProfile => match location {
            Screen::ProfileCompletion => None,
            _ => Some(Route::ProfileCompletion),
        },
        SessionPhase::NeedsOnboarding => match location {
            Screen::Onboarding => None,
            _ => Some(Route::Onboarding),
        },
        SessionPhase::Ready => match location.group() {
            ScreenGroup::Unauthenticated | ScreenGroup::Onboarding => Some(Route::MainApp),
            ScreenGroup::ProfileCompletion | ScreenGroup::Main => None,
        },
    }
}

// =============================================================================
// DRIVER
// =============================================================================

/// Re-run reconciliation on every snapshot change, pushing any decision to
/// the navigator. Returns a handle for shutdown.
pub fn spawn_reconcile_task(
    mut snapshots: watch::Receiver<IdentitySnapshot>,
    navigator: Navigator,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            let snapshot = snapshots.borrow_and_update().clone();
            if let Some(route) = reconcile(&snapshot, navigator.current()) {
                debug!(?route, "reconciled route change");
                navigator.replace(route);
            }
            if snapshots.changed().await.is_err() {
                break;
            }
        }
    })
}

#[cfg(test)]
#[path = "reconcile_test.rs"]
mod tests;
