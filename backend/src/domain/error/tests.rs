//! Tests for domain error construction and trace propagation.

use super::*;
use rstest::{fixture, rstest};
use serde_json::json;

const TRACE_ID: &str = "00000000-0000-0000-0000-000000000000";

#[fixture]
fn expected_trace_id() -> String {
    TRACE_ID.to_owned()
}

#[rstest]
#[case(Error::duplicate_username("taken"), ErrorCode::DuplicateUsername)]
#[case(Error::duplicate_email("taken"), ErrorCode::DuplicateEmail)]
#[case(Error::invalid_credentials("nope"), ErrorCode::InvalidCredentials)]
#[case(Error::unauthenticated("login"), ErrorCode::Unauthenticated)]
#[case(Error::forbidden("admins only"), ErrorCode::Forbidden)]
#[case(Error::not_found("missing"), ErrorCode::NotFound)]
#[case(Error::validation_failed("bad"), ErrorCode::ValidationFailed)]
#[case(Error::storage_failure("disk"), ErrorCode::StorageFailure)]
#[case(Error::service_unavailable("db"), ErrorCode::ServiceUnavailable)]
#[case(Error::internal("boom"), ErrorCode::InternalError)]
fn constructors_set_code(#[case] error: Error, #[case] expected: ErrorCode) {
    assert_eq!(error.code(), expected);
}

#[rstest]
fn try_new_rejects_empty_messages() {
    let result = Error::try_new(ErrorCode::ValidationFailed, "   ");
    assert!(matches!(result, Err(ErrorValidationError::EmptyMessage)));
}

#[rstest]
fn try_with_trace_id_rejects_empty_values() {
    let result = Error::not_found("missing").try_with_trace_id("  ");
    assert!(matches!(result, Err(ErrorValidationError::EmptyTraceId)));
}

#[rstest]
fn new_has_no_trace_id_out_of_scope() {
    assert!(Error::internal("boom").trace_id().is_none());
}

#[rstest]
#[tokio::test]
async fn new_captures_trace_id_in_scope(expected_trace_id: String) {
    let trace_id: TraceId = expected_trace_id.parse().expect("fixture UUID");
    let error = TraceId::scope(trace_id, async move { Error::internal("boom") }).await;
    assert_eq!(error.trace_id(), Some(expected_trace_id.as_str()));
}

#[rstest]
fn serialises_snake_case_codes_and_omits_empty_fields() {
    let value = serde_json::to_value(Error::validation_failed("bad")).expect("serialise");
    assert_eq!(value, json!({ "code": "validation_failed", "message": "bad" }));
}

#[rstest]
fn details_round_trip_through_json(expected_trace_id: String) {
    let error = Error::validation_failed("bad")
        .with_trace_id(expected_trace_id)
        .with_details(json!({ "fields": [{ "field": "title" }] }));
    let text = serde_json::to_string(&error).expect("serialise");
    let parsed: Error = serde_json::from_str(&text).expect("deserialise");
    assert_eq!(parsed, error);
}
