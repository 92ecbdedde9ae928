use uuid::Uuid;

use super::{parse_session_body, parse_signup_body, parse_verify_email};
use crate::identity::IdentityError;

// =============================================================================
// SESSION RESPONSES
// =============================================================================

#[test]
fn token_response_parses_into_a_session() {
    let body = r#"{
        "access_token": "jwt-value",
        "expires_in": 3600,
        "user": { "id": "6ecd8c99-4036-403d-bf84-cf8400f67836", "email": "a@b.com" }
    }"#;

    let session = parse_session_body(body).unwrap();
    assert_eq!(session.access_token, "jwt-value");
    assert_eq!(session.user_id, Uuid::parse_str("6ecd8c99-4036-403d-bf84-cf8400f67836").unwrap());
    assert_eq!(session.email.as_deref(), Some("a@b.com"));
    assert!(session.expires_at.is_some());
}

#[test]
fn session_without_access_token_is_unexpected() {
    let err = parse_session_body(r#"{"user":{"id":"not-a-uuid"}}"#).unwrap_err();
    assert!(matches!(err, IdentityError::UnexpectedResponse(_)));
}

#[test]
fn session_with_malformed_user_id_is_unexpected() {
    let body = r#"{"access_token":"jwt","user":{"id":"not-a-uuid"}}"#;
    let err = parse_session_body(body).unwrap_err();
    assert!(matches!(err, IdentityError::UnexpectedResponse(_)));
}

// =============================================================================
// SIGNUP RESPONSES
// =============================================================================

#[test]
fn pending_confirmation_signup_parses_top_level_user() {
    let body = r#"{
        "id": "6ecd8c99-4036-403d-bf84-cf8400f67836",
        "email": "a@b.com",
        "email_confirmed_at": null,
        "identities": [{"id": "6ecd8c99-4036-403d-bf84-cf8400f67836"}]
    }"#;

    let outcome = parse_signup_body(body).unwrap();
    assert!(outcome.confirmation_required);
    assert!(outcome.user_id.is_some());
}

#[test]
fn immediate_session_signup_parses_nested_user() {
    let body = r#"{
        "access_token": "jwt",
        "user": {
            "id": "6ecd8c99-4036-403d-bf84-cf8400f67836",
            "email_confirmed_at": "2026-01-01T00:00:00Z",
            "identities": [{"id": "x"}]
        }
    }"#;

    let outcome = parse_signup_body(body).unwrap();
    assert!(!outcome.confirmation_required);
}

#[test]
fn empty_identities_means_the_address_is_taken() {
    // The service obscures duplicates by returning a user whose identities
    // list is empty instead of an error status.
    let body = r#"{
        "id": "6ecd8c99-4036-403d-bf84-cf8400f67836",
        "email": "a@b.com",
        "email_confirmed_at": null,
        "identities": []
    }"#;

    assert_eq!(parse_signup_body(body).unwrap_err(), IdentityError::AlreadyRegistered);
}

// =============================================================================
// VERIFY RESPONSES
// =============================================================================

#[test]
fn verify_email_is_read_from_either_shape() {
    assert_eq!(
        parse_verify_email(r#"{"user":{"email":"a@b.com"}}"#).as_deref(),
        Some("a@b.com")
    );
    assert_eq!(parse_verify_email(r#"{"email":"a@b.com"}"#).as_deref(), Some("a@b.com"));
    assert_eq!(parse_verify_email(r#"{}"#), None);
    assert_eq!(parse_verify_email("not json"), None);
}
