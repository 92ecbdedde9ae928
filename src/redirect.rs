//! Redirect-URL builders for confirmation and recovery emails.
//!
//! The identity service embeds these targets in the mail it sends; they must
//! come back as either the custom app scheme (native) or the web origin so
//! the deep-link parser recognizes them on return.

pub const DEFAULT_APP_SCHEME: &str = "com.returntrackr";
pub const FALLBACK_WEB_ORIGIN: &str = "https://returntrackr.app";

const RESET_PASSWORD_PATH: &str = "reset-password";

/// Platform-appropriate redirect targets.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RedirectUrls {
    scheme: String,
    /// Present when running as a web app; native builds use the scheme.
    web_origin: Option<String>,
}

impl RedirectUrls {
    #[must_use]
    pub fn native(scheme: impl Into<String>) -> Self {
        Self { scheme: scheme.into(), web_origin: None }
    }

    #[must_use]
    pub fn web(origin: impl Into<String>) -> Self {
        Self {
            scheme: DEFAULT_APP_SCHEME.to_owned(),
            web_origin: Some(origin.into().trim_end_matches('/').to_owned()),
        }
    }

    /// Build a redirect URL for `path` with query parameters, e.g.
    /// `com.returntrackr://login?confirmed=true&email=a%40b.com`.
    #[must_use]
    pub fn auth_redirect_url(&self, path: &str, params: &[(&str, &str)]) -> String {
        let query: Vec<String> = params
            .iter()
            .map(|(key, value)| format!("{}={}", encode_query_value(key), encode_query_value(value)))
            .collect();
        let query_part = if query.is_empty() { String::new() } else { format!("?{}", query.join("&")) };

        match &self.web_origin {
            Some(origin) => format!("{origin}/{path}{query_part}"),
            None => format!("{}://{path}{query_part}", self.scheme),
        }
    }

    /// The password-reset landing target.
    #[must_use]
    pub fn password_reset_redirect_url(&self) -> String {
        self.auth_redirect_url(RESET_PASSWORD_PATH, &[])
    }
}

impl Default for RedirectUrls {
    fn default() -> Self {
        Self::native(DEFAULT_APP_SCHEME)
    }
}

/// Minimal percent-encoding for query values (RFC 3986 unreserved set kept).
fn encode_query_value(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for byte in raw.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char);
            }
            _ => {
                out.push('%');
                out.push_str(&format!("{byte:02X}"));
            }
        }
    }
    out
}

#[cfg(test)]
#[path = "redirect_test.rs"]
mod tests;
