//! Identity-service data types and error taxonomy.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

// =============================================================================
// SESSION
// =============================================================================

/// Server-issued proof of authentication. Opaque to this core: replaced
/// wholesale on refresh, destroyed on sign-out, never partially mutated.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub user_id: Uuid,
    pub email: Option<String>,
    #[serde(with = "time::serde::rfc3339::option", default)]
    pub expires_at: Option<OffsetDateTime>,
}

/// Discrete events pushed by the identity service, delivered in arrival order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AuthEvent {
    SignedIn(Session),
    SignedOut,
    UserUpdated(Session),
    PasswordRecovery(Session),
}

impl AuthEvent {
    /// Stable label for structured logging.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::SignedIn(_) => "SIGNED_IN",
            Self::SignedOut => "SIGNED_OUT",
            Self::UserUpdated(_) => "USER_UPDATED",
            Self::PasswordRecovery(_) => "PASSWORD_RECOVERY",
        }
    }

    /// Session payload, if this event carries one.
    #[must_use]
    pub fn session(&self) -> Option<&Session> {
        match self {
            Self::SignedIn(s) | Self::UserUpdated(s) | Self::PasswordRecovery(s) => Some(s),
            Self::SignedOut => None,
        }
    }
}

// =============================================================================
// OPERATION OUTCOMES
// =============================================================================

/// Result of a successful sign-up request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignUpOutcome {
    pub user_id: Option<Uuid>,
    /// The user must follow the confirmation email before signing in.
    pub confirmation_required: bool,
}

// =============================================================================
// ERRORS
// =============================================================================

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum IdentityError {
    #[error("identity request failed: {0}")]
    Network(String),
    #[error("token invalid or expired")]
    TokenInvalidOrExpired,
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("email already registered but not confirmed")]
    AlreadyRegistered,
    #[error("identity service error {status}: {body}")]
    Api { status: u16, body: String },
    #[error("failed to build http client: {0}")]
    HttpClientBuild(String),
    #[error("unexpected identity response: {0}")]
    UnexpectedResponse(String),
}
