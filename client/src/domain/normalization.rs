//! Conversion of heterogeneous backend failures into [`ApiError`].
//!
//! Body precedence: a string body verbatim, then `detail`, `message`,
//! `error`, `non_field_errors`, then the first key of the object, then a
//! generic server message.

use serde_json::Value;

use crate::domain::error::{ApiError, ErrorCode};
use crate::domain::ports::TransportError;

/// Message reported when no response was received.
pub const CONNECTIVITY_MESSAGE: &str =
    "Unable to reach the server. Please check your internet connection and try again.";

/// Message reported when a response body carries nothing usable.
pub const GENERIC_SERVER_MESSAGE: &str = "An unexpected server error occurred. Please try again.";

const PRIORITY_FIELDS: [&str; 3] = ["detail", "message", "error"];
const NON_FIELD_ERRORS: &str = "non_field_errors";

/// Transport-level failure shapes accepted by [`normalize`].
#[derive(Debug, Clone, PartialEq)]
pub enum TransportFailure {
    /// A response arrived with a non-success status.
    Response {
        /// HTTP status code.
        status: u16,
        /// Decoded body, if any.
        body: Option<Value>,
    },
    /// The request was sent but no response arrived.
    NoResponse {
        /// Diagnostic detail for logs.
        detail: String,
    },
    /// The request failed locally before being sent.
    Local {
        /// Original error text.
        message: String,
    },
}

impl From<TransportError> for TransportFailure {
    fn from(value: TransportError) -> Self {
        match value {
            TransportError::InvalidRequest { message } => Self::Local { message },
            other @ (TransportError::Unreachable { .. } | TransportError::Timeout { .. }) => {
                Self::NoResponse {
                    detail: other.to_string(),
                }
            }
        }
    }
}

/// Normalize a transport failure.
///
/// # Examples
/// ```
/// use serde_json::json;
/// use terrabia_client::domain::normalization::{normalize, TransportFailure};
///
/// let err = normalize(TransportFailure::Response {
///     status: 400,
///     body: Some(json!({ "non_field_errors": ["A", "B"] })),
/// });
/// assert_eq!(err.message(), "A, B");
/// assert_eq!(err.status(), Some(400));
/// ```
pub fn normalize(failure: TransportFailure) -> ApiError {
    match failure {
        TransportFailure::Response { status, body } => {
            let message = body
                .as_ref()
                .and_then(extract_message)
                .unwrap_or_else(|| GENERIC_SERVER_MESSAGE.to_owned());
            let error = ApiError::new(ErrorCode::from_status(status), message).with_status(status);
            match body {
                Some(body) => error.with_raw_data(body),
                None => error,
            }
        }
        TransportFailure::NoResponse { .. } => ApiError::transport(CONNECTIVITY_MESSAGE),
        TransportFailure::Local { message } => ApiError::configuration(message),
    }
}

/// Extract the most specific human-readable message from an error body.
pub fn extract_message(body: &Value) -> Option<String> {
    match body {
        Value::String(text) => non_blank(text),
        Value::Object(fields) => PRIORITY_FIELDS
            .iter()
            .find_map(|field| fields.get(*field).and_then(value_message))
            .or_else(|| fields.get(NON_FIELD_ERRORS).and_then(value_message))
            .or_else(|| fields.values().next().and_then(value_message)),
        _ => None,
    }
}

fn value_message(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => non_blank(text),
        Value::Array(items) => {
            let parts = items.iter().filter_map(value_message).collect::<Vec<_>>();
            if parts.is_empty() {
                None
            } else {
                Some(parts.join(", "))
            }
        }
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Object(_) => extract_message(value),
        Value::Null => None,
    }
}

fn non_blank(text: &str) -> Option<String> {
    (!text.trim().is_empty()).then(|| text.to_owned())
}
