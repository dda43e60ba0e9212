//! Driven port for dispatching prepared HTTP requests.
//!
//! The domain builds a fully prepared request (headers already injected) and
//! hands it to the transport. The transport reports what came back, success
//! or not; status interpretation belongs to the interceptor in the domain.

use async_trait::async_trait;
use serde_json::Value;

use super::define_port_error;
use crate::domain::request::PreparedRequest;

/// Raw response returned by a transport adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// HTTP status code.
    pub status: u16,
    /// Undecoded response body.
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Build a response from a status and raw body.
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Build a response carrying a JSON body.
    ///
    /// # Examples
    /// ```
    /// use serde_json::json;
    /// use terrabia_client::domain::ports::HttpResponse;
    ///
    /// let response = HttpResponse::json(200, &json!({ "ok": true }));
    /// assert!(response.is_success());
    /// assert_eq!(response.body_value(), Some(json!({ "ok": true })));
    /// ```
    pub fn json(status: u16, body: &Value) -> Self {
        Self::new(status, body.to_string())
    }

    /// Build a response with no body.
    pub fn empty(status: u16) -> Self {
        Self::new(status, Vec::new())
    }

    /// Whether the status is in the 2xx range.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Decode the body for error reporting.
    ///
    /// JSON bodies decode to their value; any other non-blank body is
    /// returned verbatim as a JSON string so plain-text errors survive
    /// normalization.
    pub fn body_value(&self) -> Option<Value> {
        if self.body.iter().all(u8::is_ascii_whitespace) {
            return None;
        }
        serde_json::from_slice(&self.body).ok().or_else(|| {
            Some(Value::String(
                String::from_utf8_lossy(&self.body).into_owned(),
            ))
        })
    }
}

define_port_error! {
    /// Failures raised before any HTTP response was received.
    pub enum TransportError {
        /// The server could not be reached.
        Unreachable { message: String } =>
            "request did not reach the server: {message}",
        /// The request timed out before a response arrived.
        Timeout { message: String } =>
            "request timed out: {message}",
        /// The request could not be built locally.
        InvalidRequest { message: String } =>
            "request could not be built: {message}",
    }
}

/// Port for sending prepared requests to the marketplace API.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Send one request and return the raw response, whatever its status.
    async fn send(&self, request: PreparedRequest) -> Result<HttpResponse, TransportError>;
}
