//! Identity service boundary — the remote auth backend as a black box.
//!
//! ARCHITECTURE
//! ============
//! Everything above this module consumes `Arc<dyn IdentityService>`: the
//! session store for the event stream and session restore, the link
//! dispatcher for token verification. The REST implementation in
//! [`rest`] talks to the hosted service; tests substitute a mock.

pub mod rest;
pub mod types;

use tokio::sync::broadcast;

pub use rest::RestIdentityClient;
pub use types::{AuthEvent, IdentityError, Session, SignUpOutcome};

/// Async operations consumed from the remote identity service.
///
/// Each call resolves with a result or a typed error; nothing here panics.
/// The event subscription delivers [`AuthEvent`]s in arrival order.
#[async_trait::async_trait]
pub trait IdentityService: Send + Sync {
    /// Register a new account. `redirect_to` is the confirmation-link target.
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        redirect_to: Option<&str>,
    ) -> Result<SignUpOutcome, IdentityError>;

    /// Password sign-in. Success is also announced on the event stream.
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, IdentityError>;

    /// End the current session. Success is announced on the event stream.
    async fn sign_out(&self) -> Result<(), IdentityError>;

    /// Send a password-reset email pointing at `redirect_to`.
    async fn send_password_reset(
        &self,
        email: &str,
        redirect_to: Option<&str>,
    ) -> Result<(), IdentityError>;

    /// Verify an email-confirmation token from a signup deep link.
    /// Returns the confirmed email address when the service reports one.
    async fn verify_signup_token(&self, token: &str) -> Result<Option<String>, IdentityError>;

    /// The session restored from host storage, if still valid.
    async fn current_session(&self) -> Result<Option<Session>, IdentityError>;

    /// Subscribe to the auth event stream.
    fn subscribe(&self) -> broadcast::Receiver<AuthEvent>;
}

// =============================================================================
// TEST HELPERS
// =============================================================================
