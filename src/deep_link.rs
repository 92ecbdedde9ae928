//! Deep-link parsing — structured intent out of an incoming URL string.
//!
//! DESIGN
//! ======
//! Pure and total: any string maps to a [`LinkIntent`], unrecognized shapes
//! to [`LinkKind::Unknown`]. Parsing is scheme-agnostic because confirmation
//! mail can deliver either the custom app scheme or the https web origin;
//! only query pairs and path markers matter.

use std::collections::HashMap;

// =============================================================================
// INTENT MODEL
// =============================================================================

/// Classified purpose of an auth deep link.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LinkKind {
    /// Email-confirmation link. `token == None` means the confirmation was
    /// already handled server-side and only routing remains.
    Signup,
    /// Password-recovery link. `token == None` is the post-reset success
    /// redirect.
    Recovery,
    /// Team/organization invitation.
    Invite,
    Unknown,
}

/// Parsed intent of one incoming URL. Produced once, consumed once.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LinkIntent {
    pub kind: LinkKind,
    pub token: Option<String>,
    /// All query pairs found in the URL, for payloads like `email=`.
    pub extra: HashMap<String, String>,
}

impl LinkIntent {
    fn unknown(extra: HashMap<String, String>) -> Self {
        Self { kind: LinkKind::Unknown, token: None, extra }
    }
}

// =============================================================================
// PARSER
// =============================================================================

/// Extract a [`LinkIntent`] from an incoming URL. Never panics.
///
/// Classification priority: `type=signup` with a token, then recovery markers
/// (`type=recovery` or a `reset-password`/`forgot-password` path) with a
/// token, then `type=invite` with a token, then the zero-token
/// `confirmed=true` / `reset-success=true` success redirects. Anything else
/// is [`LinkKind::Unknown`] and must be ignored by callers.
#[must_use]
pub fn parse(url: &str) -> LinkIntent {
    let extra = query_pairs(url);
    let token = extra.get("token").cloned().filter(|t| !t.is_empty());
    let link_type = extra.get("type").map(String::as_str);

    if let Some(token) = token {
        let kind = if link_type == Some("signup") {
            Some(LinkKind::Signup)
        } else if link_type == Some("recovery") || has_recovery_path(url) {
            Some(LinkKind::Recovery)
        } else if link_type == Some("invite") {
            Some(LinkKind::Invite)
        } else {
            None
        };
        return match kind {
            Some(kind) => LinkIntent { kind, token: Some(token), extra },
            None => LinkIntent::unknown(extra),
        };
    }

    if extra.get("confirmed").is_some_and(|v| v == "true") {
        return LinkIntent { kind: LinkKind::Signup, token: None, extra };
    }
    if extra.get("reset-success").is_some_and(|v| v == "true") {
        return LinkIntent { kind: LinkKind::Recovery, token: None, extra };
    }

    LinkIntent::unknown(extra)
}

fn has_recovery_path(url: &str) -> bool {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    path.contains("reset-password") || path.contains("forgot-password")
}

/// Collect `key=value` pairs from the query and fragment portions.
///
/// Confirmation providers deliver parameters in either portion depending on
/// the flow, so both are scanned. Later occurrences of a key win.
fn query_pairs(url: &str) -> HashMap<String, String> {
    let mut pairs = HashMap::new();
    for portion in url.split(['?', '#']).skip(1) {
        for pair in portion.split('&') {
            if let Some((key, value)) = pair.split_once('=') {
                if !key.is_empty() {
                    pairs.insert(key.to_owned(), value.to_owned());
                }
            }
        }
    }
    pairs
}

#[cfg(test)]
#[path = "deep_link_test.rs"]
mod tests;
