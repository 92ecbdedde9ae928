//! Profile store boundary — per-user row behind the hosted data API.
//!
//! ERROR HANDLING
//! ==============
//! "No row" is a normal, expected response for first-time sign-ins, not an
//! error: it maps to `Ok(None)` here and to needs-profile-completion in the
//! session store. Only transport and service faults surface as errors.

use std::time::Duration;

use serde::Deserialize;
use uuid::Uuid;

use crate::config::RemoteConfig;

// =============================================================================
// ROW MODEL
// =============================================================================

/// The fields of the `profiles` row this core cares about.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct ProfileRow {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub onboarding_completed: bool,
}

impl ProfileRow {
    /// Either name field counts; whitespace-only values do not.
    #[must_use]
    pub fn has_display_name(&self) -> bool {
        let filled = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());
        filled(&self.name) || filled(&self.display_name)
    }
}

/// Partial update for the profile flags this core owns.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct ProfileFlags {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub onboarding_completed: Option<bool>,
}

// =============================================================================
// ERRORS
// =============================================================================

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ProfileError {
    #[error("profile request failed: {0}")]
    Network(String),
    #[error("profile service error {status}: {body}")]
    Api { status: u16, body: String },
    #[error("failed to build http client: {0}")]
    HttpClientBuild(String),
    #[error("unexpected profile response: {0}")]
    UnexpectedResponse(String),
}

/// Coarse failure class recorded on the identity snapshot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FetchErrorKind {
    Network,
    Service,
}

impl ProfileError {
    #[must_use]
    pub fn kind(&self) -> FetchErrorKind {
        match self {
            Self::Network(_) => FetchErrorKind::Network,
            Self::Api { .. } | Self::HttpClientBuild(_) | Self::UnexpectedResponse(_) => {
                FetchErrorKind::Service
            }
        }
    }
}

// =============================================================================
// TRAIT
// =============================================================================

/// Async operations against the remote profile row for a user.
#[async_trait::async_trait]
pub trait ProfileStore: Send + Sync {
    /// Fetch the profile row. `Ok(None)` when the row does not exist yet.
    async fn fetch(&self, access_token: &str, user_id: Uuid)
        -> Result<Option<ProfileRow>, ProfileError>;

    /// Seed the initial row for a first-time user. Safe to race: an existing
    /// row is left untouched.
    async fn create_initial(
        &self,
        access_token: &str,
        user_id: Uuid,
        email: Option<&str>,
    ) -> Result<(), ProfileError>;

    /// Apply a partial flag update (display name, onboarding completion).
    async fn update_flags(
        &self,
        access_token: &str,
        user_id: Uuid,
        flags: &ProfileFlags,
    ) -> Result<(), ProfileError>;
}

// =============================================================================
// REST IMPLEMENTATION
// =============================================================================

/// PostgREST-style client for the hosted `profiles` table.
pub struct RestProfileStore {
    http: reqwest::Client,
    base_url: String,
    anon_key: String,
}

impl RestProfileStore {
    pub fn new(config: &RemoteConfig) -> Result<Self, ProfileError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeouts.request_secs))
            .connect_timeout(Duration::from_secs(config.timeouts.connect_secs))
            .build()
            .map_err(|e| ProfileError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, base_url: config.base_url.clone(), anon_key: config.anon_key.clone() })
    }

    fn rows_url(&self) -> String {
        format!("{}/rest/v1/profiles", self.base_url)
    }
}

#[async_trait::async_trait]
impl ProfileStore for RestProfileStore {
    async fn fetch(
        &self,
        access_token: &str,
        user_id: Uuid,
    ) -> Result<Option<ProfileRow>, ProfileError> {
        let response = self
            .http
            .get(self.rows_url())
            .query(&[
                ("id", format!("eq.{user_id}")),
                ("select", "name,display_name,onboarding_completed".to_owned()),
            ])
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| ProfileError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| ProfileError::Network(e.to_string()))?;
        if !(200..300).contains(&status) {
            return Err(ProfileError::Api { status, body });
        }
        parse_profile_rows(&body)
    }

    async fn create_initial(
        &self,
        access_token: &str,
        user_id: Uuid,
        email: Option<&str>,
    ) -> Result<(), ProfileError> {
        let response = self
            .http
            .post(self.rows_url())
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
            .header("Prefer", "resolution=ignore-duplicates,return=minimal")
            .json(&serde_json::json!({
                "id": user_id,
                "email": email.unwrap_or_default(),
                "onboarding_completed": false,
            }))
            .send()
            .await
            .map_err(|e| ProfileError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        // 409 means another device seeded the row first.
        if (200..300).contains(&status) || status == 409 {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        Err(ProfileError::Api { status, body })
    }

    async fn update_flags(
        &self,
        access_token: &str,
        user_id: Uuid,
        flags: &ProfileFlags,
    ) -> Result<(), ProfileError> {
        let response = self
            .http
            .patch(self.rows_url())
            .query(&[("id", format!("eq.{user_id}"))])
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
            .header("Prefer", "return=minimal")
            .json(flags)
            .send()
            .await
            .map_err(|e| ProfileError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        if (200..300).contains(&status) {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        Err(ProfileError::Api { status, body })
    }
}

pub(crate) fn parse_profile_rows(body: &str) -> Result<Option<ProfileRow>, ProfileError> {
    let rows: Vec<ProfileRow> =
        serde_json::from_str(body).map_err(|e| ProfileError::UnexpectedResponse(e.to_string()))?;
    Ok(rows.into_iter().next())
}

// =============================================================================
// TEST HELPERS
// =============================================================================

#[cfg(test)]
pub mod test_helpers {
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, Ordering};

    use tokio::sync::Semaphore;
    use uuid::Uuid;

    use super::{ProfileError, ProfileFlags, ProfileRow, ProfileStore};

    /// In-memory profile store whose fetches can be held open to exercise
    /// the stale-result discard path.
    pub struct MockProfiles {
        pub rows: Mutex<HashMap<Uuid, ProfileRow>>,
        pub fail_fetch: Mutex<Option<ProfileError>>,
        pub created: Mutex<Vec<Uuid>>,
        hold_fetches: AtomicBool,
        gate: Semaphore,
    }

    impl MockProfiles {
        #[must_use]
        pub fn new() -> Self {
            Self {
                rows: Mutex::new(HashMap::new()),
                fail_fetch: Mutex::new(None),
                created: Mutex::new(Vec::new()),
                hold_fetches: AtomicBool::new(false),
                gate: Semaphore::new(0),
            }
        }

        pub fn insert_row(&self, user_id: Uuid, row: ProfileRow) {
            self.rows.lock().unwrap().insert(user_id, row);
        }

        /// Make subsequent fetches block until [`Self::release_one`].
        pub fn hold_fetches(&self) {
            self.hold_fetches.store(true, Ordering::SeqCst);
        }

        pub fn release_one(&self) {
            self.gate.add_permits(1);
        }
    }

    #[async_trait::async_trait]
    impl ProfileStore for MockProfiles {
        async fn fetch(
            &self,
            _access_token: &str,
            user_id: Uuid,
        ) -> Result<Option<ProfileRow>, ProfileError> {
            if self.hold_fetches.load(Ordering::SeqCst) {
                let permit = self.gate.acquire().await.unwrap();
                permit.forget();
            }
            if let Some(err) = self.fail_fetch.lock().unwrap().take() {
                return Err(err);
            }
            Ok(self.rows.lock().unwrap().get(&user_id).cloned())
        }

        async fn create_initial(
            &self,
            _access_token: &str,
            user_id: Uuid,
            _email: Option<&str>,
        ) -> Result<(), ProfileError> {
            self.created.lock().unwrap().push(user_id);
            Ok(())
        }

        async fn update_flags(
            &self,
            _access_token: &str,
            user_id: Uuid,
            flags: &ProfileFlags,
        ) -> Result<(), ProfileError> {
            let mut rows = self.rows.lock().unwrap();
            let row = rows.entry(user_id).or_default();
            if let Some(name) = &flags.name {
                row.name = Some(name.clone());
            }
            if let Some(display_name) = &flags.display_name {
                row.display_name = Some(display_name.clone());
            }
            if let Some(done) = flags.onboarding_completed {
                row.onboarding_completed = done;
            }
            Ok(())
        }
    }
}

#[cfg(test)]
#[path = "profile_test.rs"]
mod tests;
