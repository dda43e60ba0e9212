//! HTTP client core and the response interceptor.
//!
//! [`ApiClient`] owns the only refresh policy in the crate. Every logical
//! request runs through [`ApiClient::send`]:
//!
//! - 2xx returns the response;
//! - 401 on a bearer request that has not been retried refreshes the access
//!   token once and reissues the request;
//! - a failed refresh clears the session, redirects to the login boundary
//!   and rejects with [`ErrorCode::SessionExpired`];
//! - 403 is logged as a permission problem and rejected;
//! - anything else is rejected with the normalized error.

mod refresh;

pub use refresh::{NO_REFRESH_TOKEN, SESSION_EXPIRED_MESSAGE};

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::domain::endpoints::{
    AuthEndpoints, CartEndpoints, ChatEndpoints, DeliveryEndpoints, LocationEndpoints,
    NotificationEndpoints, OrderEndpoints, PaymentEndpoints, ProductEndpoints, ReviewEndpoints,
    UserEndpoints,
};
use crate::domain::error::{ApiError, ApiResult, ErrorCode};
use crate::domain::normalization::{TransportFailure, normalize};
use crate::domain::ports::{HttpResponse, HttpTransport, LoginBoundary};
use crate::domain::request::{AuthPolicy, PreparedRequest, RequestDescriptor};
use crate::domain::session::SessionStore;
use crate::domain::trace_id::TraceId;

struct ClientInner {
    transport: Arc<dyn HttpTransport>,
    session: SessionStore,
    login_boundary: Arc<dyn LoginBoundary>,
    refresh_gate: tokio::sync::Mutex<()>,
}

/// Shared, cheaply cloneable API client.
///
/// Clones share the transport, the session store and the refresh gate. A
/// clone produced by [`ApiClient::with_cancellation`] additionally ties every
/// request it sends to a cancellation token.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ClientInner>,
    cancellation: Option<CancellationToken>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("session", &self.inner.session)
            .field("cancellable", &self.cancellation.is_some())
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        session: SessionStore,
        login_boundary: Arc<dyn LoginBoundary>,
    ) -> Self {
        Self {
            inner: Arc::new(ClientInner {
                transport,
                session,
                login_boundary,
                refresh_gate: tokio::sync::Mutex::new(()),
            }),
            cancellation: None,
        }
    }

    /// Session store shared by every clone of this client.
    pub fn session(&self) -> &SessionStore {
        &self.inner.session
    }

    /// Clone of this client whose requests are aborted when `token` fires.
    #[must_use]
    pub fn with_cancellation(&self, token: CancellationToken) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            cancellation: Some(token),
        }
    }

    /// Send a logical request through the interceptor.
    ///
    /// # Errors
    ///
    /// Returns the normalized error for any non-2xx outcome that the refresh
    /// path could not recover, a transport error when no response arrived,
    /// or [`ErrorCode::Cancelled`] when the request's token fired.
    pub async fn send(&self, mut descriptor: RequestDescriptor) -> ApiResult<HttpResponse> {
        descriptor.inherit_cancellation(self.cancellation.as_ref());
        loop {
            let token = match descriptor.auth() {
                AuthPolicy::Bearer => self.session().access_token()?,
                AuthPolicy::Anonymous => None,
            };
            let response = self.execute_once(&descriptor, token.as_deref()).await?;
            if response.is_success() {
                return Ok(response);
            }

            match response.status {
                401 if descriptor.auth() == AuthPolicy::Bearer && !descriptor.is_retried() => {
                    descriptor.mark_retried();
                    debug!(path = descriptor.path(), "access token rejected; refreshing");
                    self.refresh_after_unauthorized(token.as_deref(), &descriptor)
                        .await?;
                }
                403 => {
                    warn!(
                        method = %descriptor.method(),
                        path = descriptor.path(),
                        "permission denied by server"
                    );
                    return Err(response_error(&response));
                }
                _ => return Err(response_error(&response)),
            }
        }
    }

    /// Send a request and decode the JSON body.
    ///
    /// An empty success body decodes as JSON `null`, so `Option<T>` and `()`
    /// targets accept `204 No Content`.
    ///
    /// # Errors
    ///
    /// As [`ApiClient::send`], plus [`ErrorCode::InvalidResponse`] when the
    /// body does not match `T`.
    pub async fn send_json<T: DeserializeOwned>(
        &self,
        descriptor: RequestDescriptor,
    ) -> ApiResult<T> {
        let path = descriptor.path().to_owned();
        let response = self.send(descriptor).await?;
        decode_body(&path, &response)
    }

    /// Send a request and discard the body.
    ///
    /// # Errors
    ///
    /// As [`ApiClient::send`].
    pub async fn send_unit(&self, descriptor: RequestDescriptor) -> ApiResult<()> {
        self.send(descriptor).await.map(|_| ())
    }

    /// Authentication endpoints.
    pub fn auth(&self) -> AuthEndpoints<'_> {
        AuthEndpoints::new(self)
    }

    /// Product and category endpoints.
    pub fn products(&self) -> ProductEndpoints<'_> {
        ProductEndpoints::new(self)
    }

    /// Cart endpoints.
    pub fn cart(&self) -> CartEndpoints<'_> {
        CartEndpoints::new(self)
    }

    /// Order endpoints.
    pub fn orders(&self) -> OrderEndpoints<'_> {
        OrderEndpoints::new(self)
    }

    /// User directory endpoints.
    pub fn users(&self) -> UserEndpoints<'_> {
        UserEndpoints::new(self)
    }

    /// Delivery-agent endpoints.
    pub fn delivery(&self) -> DeliveryEndpoints<'_> {
        DeliveryEndpoints::new(self)
    }

    /// Review endpoints.
    pub fn reviews(&self) -> ReviewEndpoints<'_> {
        ReviewEndpoints::new(self)
    }

    /// Chat endpoints.
    pub fn chat(&self) -> ChatEndpoints<'_> {
        ChatEndpoints::new(self)
    }

    /// Notification endpoints.
    pub fn notifications(&self) -> NotificationEndpoints<'_> {
        NotificationEndpoints::new(self)
    }

    /// Geocoding endpoints.
    pub fn location(&self) -> LocationEndpoints<'_> {
        LocationEndpoints::new(self)
    }

    /// Payment endpoints.
    pub fn payments(&self) -> PaymentEndpoints<'_> {
        PaymentEndpoints::new(self)
    }

    /// Prepare and dispatch one attempt without interpreting the status.
    async fn execute_once(
        &self,
        descriptor: &RequestDescriptor,
        access_token: Option<&str>,
    ) -> ApiResult<HttpResponse> {
        let trace_id = TraceId::current_or_generate();
        let prepared = descriptor.prepare(access_token, trace_id);
        debug!(
            method = %prepared.method,
            path = %prepared.path,
            trace_id = %trace_id,
            retried = descriptor.is_retried(),
            "dispatching request"
        );
        self.dispatch(prepared, descriptor.cancellation()).await
    }

    async fn dispatch(
        &self,
        prepared: PreparedRequest,
        cancellation: Option<&CancellationToken>,
    ) -> ApiResult<HttpResponse> {
        let outcome = match cancellation {
            Some(token) => {
                if token.is_cancelled() {
                    return Err(ApiError::cancelled());
                }
                tokio::select! {
                    biased;
                    () = token.cancelled() => return Err(ApiError::cancelled()),
                    outcome = self.inner.transport.send(prepared) => outcome,
                }
            }
            None => self.inner.transport.send(prepared).await,
        };
        outcome.map_err(|error| {
            warn!(%error, "request failed without a response");
            normalize(TransportFailure::from(error))
        })
    }
}

fn response_error(response: &HttpResponse) -> ApiError {
    normalize(TransportFailure::Response {
        status: response.status,
        body: response.body_value(),
    })
}

fn decode_body<T: DeserializeOwned>(path: &str, response: &HttpResponse) -> ApiResult<T> {
    let decoded = if response.body.iter().all(u8::is_ascii_whitespace) {
        serde_json::from_value(Value::Null)
    } else {
        serde_json::from_slice(&response.body)
    };
    decoded.map_err(|error| {
        warn!(path, %error, "unexpected response body");
        ApiError::new(
            ErrorCode::InvalidResponse,
            format!("Unexpected response from {path}: {error}"),
        )
        .with_status(response.status)
    })
}

#[cfg(test)]
mod tests;
