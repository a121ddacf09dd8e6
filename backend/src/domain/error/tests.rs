//! Tests for domain error construction, trace capture, and serde contracts.

use super::*;
use rstest::{fixture, rstest};
use serde_json::json;

const TRACE_ID: &str = "00000000-0000-0000-0000-000000000000";

#[fixture]
fn expected_trace_id() -> String {
    TRACE_ID.to_owned()
}

#[rstest]
#[case(Error::invalid_request("bad"), ErrorCode::InvalidRequest)]
#[case(Error::unauthorized("who"), ErrorCode::Unauthorized)]
#[case(Error::forbidden("no"), ErrorCode::Forbidden)]
#[case(Error::not_found("gone"), ErrorCode::NotFound)]
#[case(Error::conflict("clash"), ErrorCode::Conflict)]
#[case(Error::locked("wait"), ErrorCode::Locked)]
#[case(Error::service_unavailable("down"), ErrorCode::ServiceUnavailable)]
#[case(Error::internal("boom"), ErrorCode::InternalError)]
fn convenience_constructors_set_code(#[case] error: Error, #[case] expected: ErrorCode) {
    assert_eq!(error.code(), expected);
}

#[rstest]
fn try_new_rejects_empty_messages() {
    let result = Error::try_new(ErrorCode::InvalidRequest, "   ");
    assert!(matches!(result, Err(ErrorValidationError::EmptyMessage)));
}

#[rstest]
fn try_with_trace_id_rejects_empty_values() {
    let result = Error::invalid_request("bad").try_with_trace_id("  ");
    assert!(matches!(result, Err(ErrorValidationError::EmptyTraceId)));
}

#[rstest]
fn new_returns_none_when_trace_id_out_of_scope() {
    assert!(Error::internal("boom").trace_id().is_none());
}

#[rstest]
#[tokio::test]
async fn new_captures_trace_id_in_scope(expected_trace_id: String) {
    let trace_id: TraceId = expected_trace_id.parse().expect("valid UUID");
    let error = TraceId::scope(trace_id, async move { Error::forbidden("staff access required") })
        .await;

    assert_eq!(error.trace_id(), Some(expected_trace_id.as_str()));
}

#[rstest]
#[tokio::test]
async fn deserialising_ignores_ambient_trace(expected_trace_id: String) {
    let trace_id: TraceId = expected_trace_id.parse().expect("valid UUID");
    let payload = json!({ "code": "not_found", "message": "missing" });

    let error: Error = TraceId::scope(trace_id, async move {
        serde_json::from_value(payload).expect("valid payload")
    })
    .await;

    assert!(error.trace_id().is_none());
}

#[rstest]
fn serialises_camel_case_and_skips_empty_fields() {
    let error = Error::invalid_request("age must be between 0 and 100")
        .with_details(json!({ "field": "age", "code": "age_out_of_range" }))
        .with_trace_id("abc");

    let value = serde_json::to_value(&error).expect("serialise error");
    assert_eq!(value.get("code"), Some(&json!("invalid_request")));
    assert_eq!(value.get("traceId"), Some(&json!("abc")));
    assert_eq!(
        value.pointer("/details/field").and_then(serde_json::Value::as_str),
        Some("age")
    );

    let bare = serde_json::to_value(Error::locked("account locked")).expect("serialise error");
    assert!(bare.get("details").is_none());
    assert!(bare.get("traceId").is_none());
}

#[rstest]
fn deserialising_blank_message_fails() {
    let payload = json!({ "code": "conflict", "message": " " });
    assert!(serde_json::from_value::<Error>(payload).is_err());
}
