//! Outgoing request descriptors and their prepared, header-complete form.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::domain::error::{ApiError, ApiResult};
use crate::domain::trace_id::TraceId;

/// Authorization header name.
pub const AUTHORIZATION: &str = "Authorization";
/// Content type header name.
pub const CONTENT_TYPE: &str = "Content-Type";
/// Trace correlation header name.
pub const TRACE_ID_HEADER: &str = "X-Trace-Id";
/// JSON media type.
pub const APPLICATION_JSON: &str = "application/json";

/// HTTP verbs used by the marketplace API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    /// Upper-case verb as sent on the wire.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a request participates in bearer authentication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthPolicy {
    /// Attach the access token and refresh it on 401.
    #[default]
    Bearer,
    /// Never attach a token and never refresh (login, registration, refresh).
    Anonymous,
}

/// One uploaded file inside a multipart form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePart {
    /// Form field name.
    pub field: String,
    /// File name reported to the server.
    pub file_name: String,
    /// MIME type, when known.
    pub content_type: Option<String>,
    /// File contents.
    pub bytes: Vec<u8>,
}

/// Opaque multipart payload used for media uploads.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MultipartForm {
    /// Plain text fields in insertion order.
    pub fields: Vec<(String, String)>,
    /// File parts in insertion order.
    pub files: Vec<FilePart>,
}

impl MultipartForm {
    /// Append a text field.
    #[must_use]
    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((name.into(), value.into()));
        self
    }

    /// Append a file part.
    #[must_use]
    pub fn file(mut self, part: FilePart) -> Self {
        self.files.push(part);
        self
    }
}

/// Request payload.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum RequestBody {
    /// No body.
    #[default]
    Empty,
    /// JSON document.
    Json(Value),
    /// Multipart form; never JSON-serialized.
    Multipart(MultipartForm),
}

/// Logical request built by endpoint groups.
///
/// `retried` is the one-shot guard consulted by the 401 refresh path.
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    method: HttpMethod,
    path: String,
    query: Vec<(String, String)>,
    headers: BTreeMap<String, String>,
    body: RequestBody,
    auth: AuthPolicy,
    retried: bool,
    cancellation: Option<CancellationToken>,
}

impl RequestDescriptor {
    /// Start a descriptor for `method` on a path relative to the base URL.
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            headers: BTreeMap::new(),
            body: RequestBody::Empty,
            auth: AuthPolicy::Bearer,
            retried: false,
            cancellation: None,
        }
    }

    /// GET descriptor.
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, path)
    }

    /// POST descriptor.
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, path)
    }

    /// PUT descriptor.
    pub fn put(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Put, path)
    }

    /// PATCH descriptor.
    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Patch, path)
    }

    /// DELETE descriptor.
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Delete, path)
    }

    /// Append a query parameter.
    #[must_use]
    pub fn with_query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    /// Append a query parameter when `value` is present.
    #[must_use]
    pub fn with_optional_query(self, key: impl Into<String>, value: Option<impl ToString>) -> Self {
        match value {
            Some(value) => self.with_query(key, value),
            None => self,
        }
    }

    /// Set a caller-supplied header.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Serialize `body` as the JSON payload.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when `body` cannot be serialized.
    pub fn with_json<T: Serialize + ?Sized>(mut self, body: &T) -> ApiResult<Self> {
        let value = serde_json::to_value(body).map_err(|error| {
            ApiError::configuration(format!("could not encode request body: {error}"))
        })?;
        self.body = RequestBody::Json(value);
        Ok(self)
    }

    /// Use a multipart payload.
    #[must_use]
    pub fn with_multipart(mut self, form: MultipartForm) -> Self {
        self.body = RequestBody::Multipart(form);
        self
    }

    /// Mark the request as not carrying bearer credentials.
    #[must_use]
    pub fn anonymous(mut self) -> Self {
        self.auth = AuthPolicy::Anonymous;
        self
    }

    /// Tie the request to a cancellation token.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// HTTP verb.
    pub fn method(&self) -> HttpMethod {
        self.method
    }

    /// Path relative to the base URL.
    pub fn path(&self) -> &str {
        self.path.as_str()
    }

    /// Request payload.
    pub fn body(&self) -> &RequestBody {
        &self.body
    }

    /// Authentication policy.
    pub fn auth(&self) -> AuthPolicy {
        self.auth
    }

    /// Whether the one-shot refresh retry has been spent.
    pub fn is_retried(&self) -> bool {
        self.retried
    }

    pub(crate) fn mark_retried(&mut self) {
        self.retried = true;
    }

    pub(crate) fn cancellation(&self) -> Option<&CancellationToken> {
        self.cancellation.as_ref()
    }

    pub(crate) fn inherit_cancellation(&mut self, token: Option<&CancellationToken>) {
        if self.cancellation.is_none() {
            self.cancellation = token.cloned();
        }
    }

    /// Produce the wire-ready request for one dispatch attempt.
    ///
    /// Injects `Authorization: Bearer <token>` for bearer requests when a
    /// token is available, a JSON content type for non-multipart bodies, and
    /// the trace header. The body itself is never altered.
    ///
    /// # Examples
    /// ```
    /// use terrabia_client::TraceId;
    /// use terrabia_client::domain::request::{RequestDescriptor, AUTHORIZATION};
    ///
    /// let prepared = RequestDescriptor::get("orders/").prepare(Some("abc"), TraceId::generate());
    /// assert_eq!(prepared.header(AUTHORIZATION), Some("Bearer abc"));
    /// ```
    pub fn prepare(&self, access_token: Option<&str>, trace_id: TraceId) -> PreparedRequest {
        let mut headers = self.headers.clone();
        headers.remove(AUTHORIZATION);
        if let (AuthPolicy::Bearer, Some(token)) = (self.auth, access_token) {
            headers.insert(AUTHORIZATION.to_owned(), format!("Bearer {token}"));
        }
        match self.body {
            RequestBody::Multipart(_) => {
                headers.remove(CONTENT_TYPE);
            }
            RequestBody::Empty | RequestBody::Json(_) => {
                headers
                    .entry(CONTENT_TYPE.to_owned())
                    .or_insert_with(|| APPLICATION_JSON.to_owned());
            }
        }
        headers.insert(TRACE_ID_HEADER.to_owned(), trace_id.to_string());

        PreparedRequest {
            method: self.method,
            path: self.path.clone(),
            query: self.query.clone(),
            headers,
            body: self.body.clone(),
        }
    }
}

/// Wire-ready request handed to the transport port.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedRequest {
    /// HTTP verb.
    pub method: HttpMethod,
    /// Path relative to the base URL.
    pub path: String,
    /// Query parameters in insertion order.
    pub query: Vec<(String, String)>,
    /// Final header set.
    pub headers: BTreeMap<String, String>,
    /// Payload.
    pub body: RequestBody,
}

impl PreparedRequest {
    /// Look up a header by exact name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    //! Header preparation rules.
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    fn trace() -> TraceId {
        TraceId::generate()
    }

    #[test]
    fn bearer_header_is_attached_when_token_present() {
        let prepared = RequestDescriptor::get("cart/").prepare(Some("tok-1"), trace());
        assert_eq!(prepared.header(AUTHORIZATION), Some("Bearer tok-1"));
    }

    #[test]
    fn no_authorization_header_without_token() {
        let prepared = RequestDescriptor::get("cart/").prepare(None, trace());
        assert!(prepared.header(AUTHORIZATION).is_none());
    }

    #[test]
    fn anonymous_requests_never_carry_tokens() {
        let prepared = RequestDescriptor::post("auth/login/")
            .anonymous()
            .prepare(Some("tok-1"), trace());
        assert!(prepared.header(AUTHORIZATION).is_none());
    }

    #[test]
    fn caller_supplied_authorization_is_replaced() {
        let prepared = RequestDescriptor::get("cart/")
            .with_header(AUTHORIZATION, "Basic stale")
            .prepare(None, trace());
        assert!(prepared.header(AUTHORIZATION).is_none());
    }

    #[rstest]
    #[case::empty(RequestDescriptor::get("products/"))]
    #[case::json(RequestDescriptor::post("cart/add/").with_json(&json!({ "product_id": 1 })).expect("json"))]
    fn json_content_type_is_the_default(#[case] descriptor: RequestDescriptor) {
        let prepared = descriptor.prepare(None, trace());
        assert_eq!(prepared.header(CONTENT_TYPE), Some(APPLICATION_JSON));
    }

    #[test]
    fn multipart_bodies_drop_json_content_type_and_stay_opaque() {
        let form = MultipartForm::default().text("name", "Kale").file(FilePart {
            field: "image".to_owned(),
            file_name: "kale.jpg".to_owned(),
            content_type: Some("image/jpeg".to_owned()),
            bytes: vec![0xFF, 0xD8],
        });
        let prepared = RequestDescriptor::post("products/")
            .with_header(CONTENT_TYPE, APPLICATION_JSON)
            .with_multipart(form.clone())
            .prepare(Some("tok"), trace());
        assert!(prepared.header(CONTENT_TYPE).is_none());
        assert_eq!(prepared.body, RequestBody::Multipart(form));
    }

    #[test]
    fn trace_header_carries_the_trace_id() {
        let trace_id = trace();
        let prepared = RequestDescriptor::get("orders/").prepare(None, trace_id);
        assert_eq!(
            prepared.header(TRACE_ID_HEADER),
            Some(trace_id.to_string().as_str())
        );
    }

    #[test]
    fn optional_query_is_skipped_when_absent() {
        let prepared = RequestDescriptor::get("products/")
            .with_optional_query("category", None::<u64>)
            .with_optional_query("search", Some("kale"))
            .prepare(None, trace());
        assert_eq!(
            prepared.query,
            vec![("search".to_owned(), "kale".to_owned())]
        );
    }
}
