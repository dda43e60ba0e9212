//! Access-token refresh and session teardown.
//!
//! Refreshes are serialized behind `refresh_gate`. A task that waited on the
//! gate first checks whether another task already replaced the token it was
//! rejected with; if so it reuses the stored token instead of spending the
//! refresh token a second time.

use tracing::{debug, error, info, warn};

use super::{ApiClient, decode_body, response_error};
use crate::domain::auth::TokenPair;
use crate::domain::endpoints::auth::REFRESH_PATH;
use crate::domain::error::{ApiError, ApiResult, ErrorCode};
use crate::domain::request::RequestDescriptor;

/// Local failure reported when no refresh token is stored.
pub const NO_REFRESH_TOKEN: &str = "No refresh token available";

/// Message carried by [`ErrorCode::SessionExpired`] errors.
pub const SESSION_EXPIRED_MESSAGE: &str = "Your session has expired. Please sign in again.";

impl ApiClient {
    /// Exchange the stored refresh token for a new access token.
    ///
    /// Persists the new access token and any rotated refresh token. Does not
    /// retry and does not tear the session down on failure; that is the
    /// interceptor's job.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when no refresh token is stored, or the
    /// normalized error of the refresh call.
    pub async fn refresh(&self) -> ApiResult<String> {
        let mut descriptor = RequestDescriptor::post(REFRESH_PATH).anonymous();
        descriptor.inherit_cancellation(self.cancellation.as_ref());
        let _gate = self.inner.refresh_gate.lock().await;
        self.refresh_locked(&descriptor).await
    }

    /// Recover from a 401 received while sending with `stale_token`.
    pub(super) async fn refresh_after_unauthorized(
        &self,
        stale_token: Option<&str>,
        original: &RequestDescriptor,
    ) -> ApiResult<()> {
        let mut descriptor = RequestDescriptor::post(REFRESH_PATH).anonymous();
        descriptor.inherit_cancellation(original.cancellation());

        let _gate = match descriptor.cancellation() {
            Some(token) => tokio::select! {
                biased;
                () = token.cancelled() => return Err(ApiError::cancelled()),
                gate = self.inner.refresh_gate.lock() => gate,
            },
            None => self.inner.refresh_gate.lock().await,
        };

        let current = self.session().access_token()?;
        if current.is_some() && current.as_deref() != stale_token {
            debug!(
                path = original.path(),
                "reusing access token refreshed by a concurrent request"
            );
            return Ok(());
        }

        match self.refresh_locked(&descriptor).await {
            Ok(_) => Ok(()),
            Err(error) if error.code() == ErrorCode::Cancelled => Err(error),
            Err(error) => Err(self.expire_session(&error)),
        }
    }

    async fn refresh_locked(&self, template: &RequestDescriptor) -> ApiResult<String> {
        let Some(refresh_token) = self.session().refresh_token()? else {
            return Err(ApiError::configuration(NO_REFRESH_TOKEN));
        };
        let descriptor = template
            .clone()
            .with_json(&serde_json::json!({ "refresh": refresh_token }))?;

        let response = self.execute_once(&descriptor, None).await?;
        if !response.is_success() {
            return Err(response_error(&response));
        }
        let tokens: TokenPair = decode_body(descriptor.path(), &response)?;
        self.session()
            .set_tokens(&tokens.access, tokens.refresh.as_deref())?;
        info!(rotated = tokens.refresh.is_some(), "access token refreshed");
        Ok(tokens.access)
    }

    /// Clear the session and send the shell to the login boundary.
    fn expire_session(&self, cause: &ApiError) -> ApiError {
        warn!(
            code = ?cause.code(),
            status = ?cause.status(),
            reason = cause.message(),
            "token refresh failed; ending session"
        );
        if let Err(clear_error) = self.session().clear() {
            error!(error = %clear_error, "failed to clear session after refresh failure");
        }
        if !self.inner.login_boundary.is_at_login() {
            self.inner.login_boundary.redirect_to_login();
        }
        ApiError::session_expired(SESSION_EXPIRED_MESSAGE).with_status(401)
    }
}
