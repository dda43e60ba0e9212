//! Regression coverage for the normalized error type.

use super::*;
use rstest::rstest;
use serde_json::json;

#[rstest]
#[case("")]
#[case("   ")]
#[case("\n\t")]
fn try_new_rejects_blank_messages(#[case] message: &str) {
    let err = ApiError::try_new(ErrorCode::Server, message).expect_err("blank must fail");
    assert_eq!(err, ApiErrorValidationError::EmptyMessage);
}

#[test]
fn new_substitutes_fallback_for_blank_messages() {
    let err = ApiError::new(ErrorCode::Server, "  ");
    assert_eq!(err.message(), FALLBACK_MESSAGE);
    assert_eq!(err.code(), ErrorCode::Server);
}

#[test]
fn configuration_errors_carry_prefix() {
    let err = ApiError::configuration("No refresh token available");
    assert_eq!(err.code(), ErrorCode::Configuration);
    assert_eq!(
        err.message(),
        "Configuration error: No refresh token available"
    );
}

#[test]
fn storage_errors_become_configuration_errors() {
    let err: ApiError = SessionStorageError::unavailable("disk full").into();
    assert_eq!(err.code(), ErrorCode::Configuration);
    assert!(err.message().contains("disk full"));
}

#[rstest]
#[case(ErrorCode::Cancelled, true)]
#[case(ErrorCode::SessionExpired, true)]
#[case(ErrorCode::Unauthorized, false)]
#[case(ErrorCode::Transport, false)]
fn terminal_codes_stop_fallbacks(#[case] code: ErrorCode, #[case] expected: bool) {
    assert_eq!(ApiError::new(code, "x").is_terminal(), expected);
}

#[rstest]
#[case(400, ErrorCode::InvalidRequest)]
#[case(401, ErrorCode::Unauthorized)]
#[case(403, ErrorCode::Forbidden)]
#[case(404, ErrorCode::NotFound)]
#[case(409, ErrorCode::InvalidRequest)]
#[case(500, ErrorCode::Server)]
#[case(503, ErrorCode::Server)]
fn statuses_classify_into_codes(#[case] status: u16, #[case] expected: ErrorCode) {
    assert_eq!(ErrorCode::from_status(status), expected);
}

#[test]
fn serde_round_trip_keeps_status_and_raw_data() {
    let err = ApiError::new(ErrorCode::InvalidRequest, "bad email")
        .with_status(400)
        .with_raw_data(json!({ "email": ["bad email"] }));
    let encoded = serde_json::to_value(&err).expect("serialize");
    assert_eq!(
        encoded,
        json!({
            "code": "invalid_request",
            "message": "bad email",
            "status": 400,
            "rawData": { "email": ["bad email"] },
        })
    );
    let decoded: ApiError = serde_json::from_value(encoded).expect("deserialize");
    assert_eq!(decoded, err);
}

#[test]
fn deserializing_blank_message_fails() {
    let result = serde_json::from_value::<ApiError>(json!({ "code": "server", "message": " " }));
    assert!(result.is_err());
}
