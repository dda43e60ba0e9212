//! Normalized error type surfaced to every caller of the client.
//!
//! Backend failures arrive in many shapes; by the time they leave the crate
//! they are all an [`ApiError`] with a stable [`ErrorCode`] and a
//! human-readable message.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::ports::SessionStorageError;

/// Message used when a caller supplies a blank message.
const FALLBACK_MESSAGE: &str = "An unexpected error occurred.";

/// Prefix distinguishing failures raised before a request was sent.
pub const CONFIGURATION_PREFIX: &str = "Configuration error: ";

/// Result alias used by every client operation.
pub type ApiResult<T> = Result<T, ApiError>;

/// Stable machine-readable error code describing the failure category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// No response was received.
    Transport,
    /// The backend rejected the credentials.
    Unauthorized,
    /// Authenticated but not permitted.
    Forbidden,
    /// The resource does not exist.
    NotFound,
    /// Validation or business-rule failure (other 4xx).
    InvalidRequest,
    /// The backend failed (5xx).
    Server,
    /// A local failure raised before the request was sent.
    Configuration,
    /// The session could not be refreshed and was torn down.
    SessionExpired,
    /// A success response could not be decoded.
    InvalidResponse,
    /// The request was cancelled by its owner.
    Cancelled,
}

impl ErrorCode {
    /// Classify an HTTP status code.
    ///
    /// # Examples
    /// ```
    /// use terrabia_client::domain::ErrorCode;
    ///
    /// assert_eq!(ErrorCode::from_status(403), ErrorCode::Forbidden);
    /// assert_eq!(ErrorCode::from_status(422), ErrorCode::InvalidRequest);
    /// assert_eq!(ErrorCode::from_status(502), ErrorCode::Server);
    /// ```
    pub fn from_status(status: u16) -> Self {
        match status {
            401 => Self::Unauthorized,
            403 => Self::Forbidden,
            404 => Self::NotFound,
            400..=499 => Self::InvalidRequest,
            _ => Self::Server,
        }
    }
}

/// Normalized error payload.
///
/// ## Invariants
/// - `message` is never blank; blank input is replaced with a generic message.
///
/// # Examples
/// ```
/// use terrabia_client::domain::{ApiError, ErrorCode};
///
/// let err = ApiError::new(ErrorCode::NotFound, "missing").with_status(404);
/// assert_eq!(err.code(), ErrorCode::NotFound);
/// assert_eq!(err.status(), Some(404));
/// assert_eq!(err.to_string(), "missing");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ApiErrorDto", into = "ApiErrorDto")]
pub struct ApiError {
    code: ErrorCode,
    message: String,
    status: Option<u16>,
    raw_data: Option<Value>,
}

/// Validation errors emitted by [`ApiError::try_new`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiErrorValidationError {
    EmptyMessage,
}

impl std::fmt::Display for ApiErrorValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyMessage => write!(f, "error message must not be empty"),
        }
    }
}

impl std::error::Error for ApiErrorValidationError {}

impl ApiError {
    /// Create an error, substituting a generic message when `message` is blank.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::try_new(code, message).unwrap_or_else(|_| Self {
            code,
            message: FALLBACK_MESSAGE.to_owned(),
            status: None,
            raw_data: None,
        })
    }

    /// Fallible constructor that rejects blank messages.
    pub fn try_new(
        code: ErrorCode,
        message: impl Into<String>,
    ) -> Result<Self, ApiErrorValidationError> {
        let message = message.into();
        if message.trim().is_empty() {
            return Err(ApiErrorValidationError::EmptyMessage);
        }
        Ok(Self {
            code,
            message,
            status: None,
            raw_data: None,
        })
    }

    /// Stable machine-readable error code.
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// Human-readable message suitable for display.
    pub fn message(&self) -> &str {
        self.message.as_str()
    }

    /// HTTP status, when a response was received.
    pub fn status(&self) -> Option<u16> {
        self.status
    }

    /// Decoded response body, when one was received.
    pub fn raw_data(&self) -> Option<&Value> {
        self.raw_data.as_ref()
    }

    /// Attach the HTTP status.
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    /// Attach the decoded response body.
    pub fn with_raw_data(mut self, raw_data: Value) -> Self {
        self.raw_data = Some(raw_data);
        self
    }

    /// Errors that must stop fallback probing and retries immediately.
    pub fn is_terminal(&self) -> bool {
        matches!(self.code, ErrorCode::Cancelled | ErrorCode::SessionExpired)
    }

    /// Convenience constructor for [`ErrorCode::Transport`].
    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Transport, message)
    }

    /// Convenience constructor for [`ErrorCode::Configuration`].
    ///
    /// The message is prefixed with [`CONFIGURATION_PREFIX`].
    pub fn configuration(detail: impl AsRef<str>) -> Self {
        Self::new(
            ErrorCode::Configuration,
            format!("{CONFIGURATION_PREFIX}{}", detail.as_ref()),
        )
    }

    /// Convenience constructor for [`ErrorCode::SessionExpired`].
    pub fn session_expired(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::SessionExpired, message)
    }

    /// Convenience constructor for [`ErrorCode::InvalidResponse`].
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidResponse, message)
    }

    /// Convenience constructor for [`ErrorCode::Cancelled`].
    pub fn cancelled() -> Self {
        Self::new(ErrorCode::Cancelled, "The request was cancelled.")
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ApiError {}

impl From<SessionStorageError> for ApiError {
    fn from(value: SessionStorageError) -> Self {
        Self::configuration(value.to_string())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiErrorDto {
    code: ErrorCode,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    raw_data: Option<Value>,
}

impl From<ApiError> for ApiErrorDto {
    fn from(value: ApiError) -> Self {
        Self {
            code: value.code,
            message: value.message,
            status: value.status,
            raw_data: value.raw_data,
        }
    }
}

impl TryFrom<ApiErrorDto> for ApiError {
    type Error = ApiErrorValidationError;

    fn try_from(value: ApiErrorDto) -> Result<Self, Self::Error> {
        let ApiErrorDto {
            code,
            message,
            status,
            raw_data,
        } = value;

        let mut error = ApiError::try_new(code, message)?;
        error.status = status;
        error.raw_data = raw_data;
        Ok(error)
    }
}

#[cfg(test)]
mod tests;
