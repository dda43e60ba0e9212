//! Reqwest-backed transport adapter.
//!
//! This adapter owns transport details only: URL resolution against the base
//! URL, body encoding, the request timeout and mapping of reqwest failures.
//! Status codes are passed through untouched for the domain to interpret.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method, Url};

use crate::domain::ports::{HttpResponse, HttpTransport, TransportError};
use crate::domain::request::{HttpMethod, MultipartForm, PreparedRequest, RequestBody};

/// Transport that sends prepared requests to one API base URL.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
    base_url: Url,
}

impl ReqwestTransport {
    /// Build a transport with an explicit request timeout and user agent.
    ///
    /// ```rust,ignore
    /// let transport = ReqwestTransport::new(base_url, Duration::from_secs(30), "terrabia/0.1");
    /// assert!(transport.is_ok() || transport.is_err());
    /// ```
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(base_url: Url, timeout: Duration, user_agent: &str) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            base_url: with_trailing_slash(base_url),
        })
    }

    /// Base URL every request path is resolved against.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, TransportError> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|error| {
                TransportError::invalid_request(format!("invalid path {path:?}: {error}"))
            })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: PreparedRequest) -> Result<HttpResponse, TransportError> {
        let url = self.endpoint(&request.path)?;
        let mut builder = self
            .client
            .request(method(request.method), url)
            .query(&request.query);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        builder = match request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(&value),
            RequestBody::Multipart(form) => builder.multipart(build_form(form)?),
        };

        let response = builder.send().await.map_err(map_transport_error)?;
        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(map_transport_error)?;
        Ok(HttpResponse::new(status, body.to_vec()))
    }
}

fn method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Patch => Method::PATCH,
        HttpMethod::Delete => Method::DELETE,
    }
}

fn build_form(form: MultipartForm) -> Result<Form, TransportError> {
    let mut multipart = Form::new();
    for (name, value) in form.fields {
        multipart = multipart.text(name, value);
    }
    for file in form.files {
        let mut part = Part::bytes(file.bytes).file_name(file.file_name);
        if let Some(content_type) = file.content_type {
            part = part.mime_str(&content_type).map_err(|error| {
                TransportError::invalid_request(format!(
                    "invalid content type {content_type:?} for field {}: {error}",
                    file.field
                ))
            })?;
        }
        multipart = multipart.part(file.field, part);
    }
    Ok(multipart)
}

/// Ensure relative joins keep the last path segment of the base URL.
fn with_trailing_slash(mut base_url: Url) -> Url {
    if !base_url.path().ends_with('/') {
        let path = format!("{}/", base_url.path());
        base_url.set_path(&path);
    }
    base_url
}

fn map_transport_error(error: reqwest::Error) -> TransportError {
    if error.is_timeout() {
        TransportError::timeout(error.to_string())
    } else if error.is_builder() {
        TransportError::invalid_request(error.to_string())
    } else {
        TransportError::unreachable(error.to_string())
    }
}
