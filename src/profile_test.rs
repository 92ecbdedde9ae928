use super::{FetchErrorKind, ProfileError, ProfileFlags, ProfileRow, parse_profile_rows};

// =============================================================================
// DISPLAY NAME
// =============================================================================

#[test]
fn either_name_field_counts_as_a_display_name() {
    let named = ProfileRow { name: Some("Ada".into()), ..ProfileRow::default() };
    assert!(named.has_display_name());

    let display = ProfileRow { display_name: Some("Ada L.".into()), ..ProfileRow::default() };
    assert!(display.has_display_name());
}

#[test]
fn empty_and_whitespace_names_do_not_count() {
    assert!(!ProfileRow::default().has_display_name());

    let blank = ProfileRow {
        name: Some(String::new()),
        display_name: Some("   ".into()),
        onboarding_completed: true,
    };
    assert!(!blank.has_display_name());
}

// =============================================================================
// RESPONSE PARSING
// =============================================================================

#[test]
fn single_row_response_parses() {
    let body = r#"[{"name":"Ada","display_name":null,"onboarding_completed":true}]"#;
    let row = parse_profile_rows(body).unwrap().unwrap();
    assert_eq!(row.name.as_deref(), Some("Ada"));
    assert!(row.onboarding_completed);
}

#[test]
fn empty_array_means_no_row_yet() {
    assert_eq!(parse_profile_rows("[]").unwrap(), None);
}

#[test]
fn missing_fields_fall_back_to_defaults() {
    let row = parse_profile_rows(r#"[{"name":"Ada"}]"#).unwrap().unwrap();
    assert_eq!(row.display_name, None);
    assert!(!row.onboarding_completed);
}

#[test]
fn non_array_body_is_an_unexpected_response() {
    let err = parse_profile_rows(r#"{"message":"JWT expired"}"#).unwrap_err();
    assert!(matches!(err, ProfileError::UnexpectedResponse(_)));
}

// =============================================================================
// FLAG UPDATES AND ERROR CLASSES
// =============================================================================

#[test]
fn flag_updates_serialize_only_the_set_fields() {
    let flags = ProfileFlags { onboarding_completed: Some(true), ..ProfileFlags::default() };
    assert_eq!(serde_json::to_string(&flags).unwrap(), r#"{"onboarding_completed":true}"#);

    let named = ProfileFlags { display_name: Some("Ada".into()), ..ProfileFlags::default() };
    assert_eq!(serde_json::to_string(&named).unwrap(), r#"{"display_name":"Ada"}"#);
}

#[test]
fn error_kinds_split_transport_from_service_faults() {
    assert_eq!(ProfileError::Network("timed out".into()).kind(), FetchErrorKind::Network);
    assert_eq!(
        ProfileError::Api { status: 500, body: String::new() }.kind(),
        FetchErrorKind::Service
    );
    assert_eq!(
        ProfileError::UnexpectedResponse("not json".into()).kind(),
        FetchErrorKind::Service
    );
}
