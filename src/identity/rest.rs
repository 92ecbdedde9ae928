//! REST client for the hosted identity service (GoTrue-style endpoints).
//!
//! DESIGN
//! ======
//! Thin HTTP wrappers per operation, pure parsing functions for testability.
//! The client holds the one restored/active session and announces its own
//! successful sign-in/sign-out on the broadcast event stream, which is how
//! the session store observes asynchronous auth changes.

use std::sync::Mutex;
use std::time::Duration;

use serde_json::Value;
use time::OffsetDateTime;
use tokio::sync::broadcast;
use uuid::Uuid;

use super::types::{AuthEvent, IdentityError, Session, SignUpOutcome};
use super::IdentityService;
use crate::config::RemoteConfig;

const EVENT_CHANNEL_CAPACITY: usize = 16;

// =============================================================================
// CLIENT
// =============================================================================

pub struct RestIdentityClient {
    http: reqwest::Client,
    base_url: String,
    anon_key: String,
    session: Mutex<Option<Session>>,
    events: broadcast::Sender<AuthEvent>,
}

impl RestIdentityClient {
    pub fn new(config: &RemoteConfig) -> Result<Self, IdentityError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeouts.request_secs))
            .connect_timeout(Duration::from_secs(config.timeouts.connect_secs))
            .build()
            .map_err(|e| IdentityError::HttpClientBuild(e.to_string()))?;
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Ok(Self {
            http,
            base_url: config.base_url.clone(),
            anon_key: config.anon_key.clone(),
            session: Mutex::new(None),
            events,
        })
    }

    /// Install a session persisted by the host (secure storage) from a
    /// previous run. Does not emit an event; `current_session` validates it.
    pub fn restore_session(&self, session: Session) {
        *self.session.lock().unwrap_or_else(std::sync::PoisonError::into_inner) = Some(session);
    }

    fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{path}", self.base_url)
    }

    fn stored_session(&self) -> Option<Session> {
        self.session.lock().unwrap_or_else(std::sync::PoisonError::into_inner).clone()
    }

    fn store_session(&self, session: Option<Session>) {
        *self.session.lock().unwrap_or_else(std::sync::PoisonError::into_inner) = session;
    }

    fn emit(&self, event: AuthEvent) {
        // No subscribers yet is fine; the store attaches at spawn.
        let _ = self.events.send(event);
    }
}

#[async_trait::async_trait]
impl IdentityService for RestIdentityClient {
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        redirect_to: Option<&str>,
    ) -> Result<SignUpOutcome, IdentityError> {
        let mut request = self
            .http
            .post(self.auth_url("signup"))
            .header("apikey", &self.anon_key)
            .json(&serde_json::json!({
                "email": email,
                "password": password,
                "data": { "profile_completed": false },
            }));
        if let Some(redirect_to) = redirect_to {
            request = request.query(&[("redirect_to", redirect_to)]);
        }

        let response = request
            .send()
            .await
            .map_err(|e| IdentityError::Network(e.to_string()))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| IdentityError::Network(e.to_string()))?;

        if !(200..300).contains(&status) {
            return Err(IdentityError::Api { status, body });
        }
        parse_signup_body(&body)
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, IdentityError> {
        let response = self
            .http
            .post(self.auth_url("token"))
            .query(&[("grant_type", "password")])
            .header("apikey", &self.anon_key)
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await
            .map_err(|e| IdentityError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| IdentityError::Network(e.to_string()))?;

        match status {
            200 => {
                let session = parse_session_body(&body)?;
                self.store_session(Some(session.clone()));
                self.emit(AuthEvent::SignedIn(session.clone()));
                Ok(session)
            }
            400 | 401 => Err(IdentityError::InvalidCredentials),
            _ => Err(IdentityError::Api { status, body }),
        }
    }

    async fn sign_out(&self) -> Result<(), IdentityError> {
        let Some(session) = self.stored_session() else {
            tracing::debug!("sign_out with no active session is a no-op");
            return Ok(());
        };

        let response = self
            .http
            .post(self.auth_url("logout"))
            .header("apikey", &self.anon_key)
            .bearer_auth(&session.access_token)
            .send()
            .await
            .map_err(|e| IdentityError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        // 401/403/404 mean the session is already gone server-side; treat the
        // sign-out as complete either way.
        if (200..300).contains(&status) || matches!(status, 401 | 403 | 404) {
            self.store_session(None);
            self.emit(AuthEvent::SignedOut);
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(IdentityError::Api { status, body })
    }

    async fn send_password_reset(
        &self,
        email: &str,
        redirect_to: Option<&str>,
    ) -> Result<(), IdentityError> {
        let mut request = self
            .http
            .post(self.auth_url("recover"))
            .header("apikey", &self.anon_key)
            .json(&serde_json::json!({ "email": email }));
        if let Some(redirect_to) = redirect_to {
            request = request.query(&[("redirect_to", redirect_to)]);
        }

        let response = request
            .send()
            .await
            .map_err(|e| IdentityError::Network(e.to_string()))?;
        let status = response.status().as_u16();
        if (200..300).contains(&status) {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        Err(IdentityError::Api { status, body })
    }

    async fn verify_signup_token(&self, token: &str) -> Result<Option<String>, IdentityError> {
        let response = self
            .http
            .post(self.auth_url("verify"))
            .header("apikey", &self.anon_key)
            .json(&serde_json::json!({ "type": "signup", "token_hash": token }))
            .send()
            .await
            .map_err(|e| IdentityError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| IdentityError::Network(e.to_string()))?;

        match status {
            200..300 => Ok(parse_verify_email(&body)),
            400 | 401 | 403 | 404 | 410 | 422 => Err(IdentityError::TokenInvalidOrExpired),
            _ => Err(IdentityError::Api { status, body }),
        }
    }

    async fn current_session(&self) -> Result<Option<Session>, IdentityError> {
        let Some(session) = self.stored_session() else {
            return Ok(None);
        };

        let response = self
            .http
            .get(self.auth_url("user"))
            .header("apikey", &self.anon_key)
            .bearer_auth(&session.access_token)
            .send()
            .await
            .map_err(|e| IdentityError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        match status {
            200..300 => Ok(Some(session)),
            401 | 403 => {
                tracing::info!("restored session rejected by identity service");
                self.store_session(None);
                Ok(None)
            }
            _ => {
                let body = response.text().await.unwrap_or_default();
                Err(IdentityError::Api { status, body })
            }
        }
    }

    fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.events.subscribe()
    }
}

// =============================================================================
// RESPONSE PARSING
// =============================================================================

pub(crate) fn parse_session_body(body: &str) -> Result<Session, IdentityError> {
    let value: Value = serde_json::from_str(body)
        .map_err(|e| IdentityError::UnexpectedResponse(e.to_string()))?;

    let access_token = value["access_token"]
        .as_str()
        .ok_or_else(|| IdentityError::UnexpectedResponse("missing access_token".into()))?
        .to_owned();
    let user = &value["user"];
    let user_id = user["id"]
        .as_str()
        .and_then(|raw| Uuid::parse_str(raw).ok())
        .ok_or_else(|| IdentityError::UnexpectedResponse("missing user id".into()))?;
    let email = user["email"].as_str().map(str::to_owned);
    let expires_at = value["expires_in"]
        .as_i64()
        .map(|secs| OffsetDateTime::now_utc() + time::Duration::seconds(secs));

    Ok(Session { access_token, user_id, email, expires_at })
}

pub(crate) fn parse_signup_body(body: &str) -> Result<SignUpOutcome, IdentityError> {
    let value: Value = serde_json::from_str(body)
        .map_err(|e| IdentityError::UnexpectedResponse(e.to_string()))?;

    // The user object is top-level when confirmation is pending, nested under
    // "user" when a session is returned immediately.
    let user = if value["user"].is_object() { &value["user"] } else { &value };

    // An existing-but-unconfirmed address comes back as a user with an empty
    // identities list.
    if user["identities"].as_array().is_some_and(Vec::is_empty) {
        return Err(IdentityError::AlreadyRegistered);
    }

    let user_id = user["id"].as_str().and_then(|raw| Uuid::parse_str(raw).ok());
    let confirmation_required = user["email_confirmed_at"].is_null();
    Ok(SignUpOutcome { user_id, confirmation_required })
}

pub(crate) fn parse_verify_email(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    let user = if value["user"].is_object() { &value["user"] } else { &value };
    user["email"].as_str().map(str::to_owned)
}

#[cfg(test)]
#[path = "rest_test.rs"]
mod tests;
