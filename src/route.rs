//! Symbolic navigation targets and screen identity.
//!
//! DESIGN
//! ======
//! The core never touches a rendering layer. Screens are identified by a
//! closed enum and grouped into the coarse regions the reconciler reasons
//! about; navigation requests are values handed to the host shell over a
//! channel, not calls into a router.

use serde::{Deserialize, Serialize};

// =============================================================================
// SCREENS
// =============================================================================

/// Every screen the host shell can report as its current location.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Screen {
    SignIn,
    SignUp,
    PreSignUp,
    ForgotPassword,
    ResetPassword,
    EmailConfirmed,
    ProfileCompletion,
    Onboarding,
    Home,
    AddReturn,
    ReturnDetails,
}

/// Coarse screen regions used by reconciliation rules.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScreenGroup {
    /// Sign-in/sign-up/recovery flow, reachable without a session.
    Unauthenticated,
    ProfileCompletion,
    Onboarding,
    /// The signed-in app proper (tabs plus its modal screens).
    Main,
}

impl Screen {
    #[must_use]
    pub fn group(self) -> ScreenGroup {
        match self {
            Self::SignIn
            | Self::SignUp
            | Self::PreSignUp
            | Self::ForgotPassword
            | Self::ResetPassword
            | Self::EmailConfirmed => ScreenGroup::Unauthenticated,
            Self::ProfileCompletion => ScreenGroup::ProfileCompletion,
            Self::Onboarding => ScreenGroup::Onboarding,
            Self::Home | Self::AddReturn | Self::ReturnDetails => ScreenGroup::Main,
        }
    }
}

// =============================================================================
// ROUTES
// =============================================================================

/// Which auth-link step failed, surfaced to the sign-in screen as a flag.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuthLinkError {
    /// The identity service rejected the confirmation token.
    Confirmation,
    /// The verification call itself failed (network or service fault).
    Verification,
}

/// Query-style payload carried into the sign-in screen.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SignInParams {
    /// Email address was just confirmed; show the success banner.
    pub confirmed: bool,
    /// Password reset completed server-side.
    pub reset_success: bool,
    /// Pre-fill the email field.
    pub email: Option<String>,
    /// Invitation token to redeem after sign-in.
    pub invite_token: Option<String>,
    pub error: Option<AuthLinkError>,
}

/// The five navigation destinations this core can request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Route {
    SignIn(SignInParams),
    ResetPassword { token: Option<String> },
    ProfileCompletion,
    Onboarding,
    MainApp,
}

impl Route {
    /// The screen the host ends up on after honoring this route.
    #[must_use]
    pub fn screen(&self) -> Screen {
        match self {
            Self::SignIn(_) => Screen::SignIn,
            Self::ResetPassword { .. } => Screen::ResetPassword,
            Self::ProfileCompletion => Screen::ProfileCompletion,
            Self::Onboarding => Screen::Onboarding,
            Self::MainApp => Screen::Home,
        }
    }
}

#[cfg(test)]
#[path = "route_test.rs"]
mod tests;
