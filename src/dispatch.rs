//! Auth-link dispatch — act on a parsed deep-link intent.
//!
//! ERROR HANDLING
//! ==============
//! Every remote failure is caught here and turned into a navigation to the
//! sign-in screen with an error flag. The user is never left on a blank or
//! stuck screen, and nothing propagates out of `dispatch`.

use std::sync::Arc;

use tracing::{debug, error, info};

use crate::deep_link::{LinkIntent, LinkKind};
use crate::identity::{IdentityError, IdentityService};
use crate::navigator::Navigator;
use crate::route::{AuthLinkError, Route, SignInParams};

pub struct AuthLinkDispatcher {
    identity: Arc<dyn IdentityService>,
    navigator: Navigator,
}

impl AuthLinkDispatcher {
    #[must_use]
    pub fn new(identity: Arc<dyn IdentityService>, navigator: Navigator) -> Self {
        Self { identity, navigator }
    }

    /// Handle one link intent. Returns whether the intent was consumed, so
    /// callers can fall through to content deep-link handling on `false`.
    pub async fn dispatch(&self, intent: &LinkIntent) -> bool {
        match intent.kind {
            LinkKind::Signup => {
                match &intent.token {
                    Some(token) => self.confirm_signup(token, intent).await,
                    None => {
                        // Confirmation already handled server-side.
                        info!("routing confirmation success redirect");
                        self.navigator.replace(Route::SignIn(SignInParams {
                            confirmed: true,
                            ..SignInParams::default()
                        }));
                    }
                }
                true
            }
            LinkKind::Recovery => {
                match intent.token.clone() {
                    Some(token) => {
                        // The password change itself is a distinct, explicit
                        // user action on the reset screen.
                        info!("routing password reset token to reset screen");
                        self.navigator.replace(Route::ResetPassword { token: Some(token) });
                    }
                    None => {
                        info!("routing password reset success redirect");
                        self.navigator.replace(Route::SignIn(SignInParams {
                            reset_success: true,
                            ..SignInParams::default()
                        }));
                    }
                }
                true
            }
            LinkKind::Invite => {
                info!("forwarding invite token to sign-in");
                self.navigator.replace(Route::SignIn(SignInParams {
                    invite_token: intent.token.clone(),
                    ..SignInParams::default()
                }));
                true
            }
            LinkKind::Unknown => {
                debug!("url not recognized as an auth link");
                false
            }
        }
    }

    async fn confirm_signup(&self, token: &str, intent: &LinkIntent) {
        info!("verifying email confirmation token");
        match self.identity.verify_signup_token(token).await {
            Ok(verified_email) => {
                let email = verified_email.or_else(|| intent.extra.get("email").cloned());
                info!("email confirmed");
                self.navigator.replace(Route::SignIn(SignInParams {
                    confirmed: true,
                    email,
                    ..SignInParams::default()
                }));
            }
            Err(IdentityError::TokenInvalidOrExpired) => {
                error!("confirmation token rejected");
                self.navigator.replace(Route::SignIn(SignInParams {
                    error: Some(AuthLinkError::Confirmation),
                    ..SignInParams::default()
                }));
            }
            Err(e) => {
                error!(error = %e, "signup token verification failed");
                self.navigator.replace(Route::SignIn(SignInParams {
                    error: Some(AuthLinkError::Verification),
                    ..SignInParams::default()
                }));
            }
        }
    }
}

#[cfg(test)]
#[path = "dispatch_test.rs"]
mod tests;
