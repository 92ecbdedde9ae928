//! Remote endpoint configuration parsed from environment variables.

pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemoteTimeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

impl Default for RemoteTimeouts {
    fn default() -> Self {
        Self { request_secs: DEFAULT_REQUEST_TIMEOUT_SECS, connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS }
    }
}

/// Connection settings for the hosted identity/profile backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteConfig {
    /// Project base URL, e.g. `https://project-ref.supabase.co`.
    pub base_url: String,
    /// Publishable anon key sent as the `apikey` header.
    pub anon_key: String,
    pub timeouts: RemoteTimeouts,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required env var {var}")]
    MissingVar { var: &'static str },
}

impl RemoteConfig {
    /// Build config from environment variables.
    ///
    /// Required:
    /// - `SUPABASE_URL`
    /// - `SUPABASE_ANON_KEY`
    ///
    /// Optional:
    /// - `REMOTE_REQUEST_TIMEOUT_SECS`: default 30
    /// - `REMOTE_CONNECT_TIMEOUT_SECS`: default 10
    pub fn from_env() -> Result<Self, ConfigError> {
        let base_url = std::env::var("SUPABASE_URL")
            .map_err(|_| ConfigError::MissingVar { var: "SUPABASE_URL" })?;
        let anon_key = std::env::var("SUPABASE_ANON_KEY")
            .map_err(|_| ConfigError::MissingVar { var: "SUPABASE_ANON_KEY" })?;
        let timeouts = RemoteTimeouts {
            request_secs: env_parse("REMOTE_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS),
            connect_secs: env_parse("REMOTE_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS),
        };
        Ok(Self::new(base_url, anon_key, timeouts))
    }

    #[must_use]
    pub fn new(base_url: impl Into<String>, anon_key: impl Into<String>, timeouts: RemoteTimeouts) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_owned();
        Self { base_url, anon_key: anon_key.into(), timeouts }
    }
}

fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
