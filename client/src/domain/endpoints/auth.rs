//! Login, registration, logout and current-user lookup.

use crate::domain::api_client::ApiClient;
use crate::domain::auth::{AuthGrant, LoginCredentials, Registration};
use crate::domain::error::{ApiError, ApiResult};
use crate::domain::fallback::FallbackChain;
use crate::domain::models::User;
use crate::domain::request::RequestDescriptor;

pub(crate) const LOGIN_PATH: &str = "auth/login/";
pub(crate) const TOKEN_PATH: &str = "auth/token/";
pub(crate) const REFRESH_PATH: &str = "auth/token/refresh/";
pub(crate) const REGISTER_PATH: &str = "auth/register/";
pub(crate) const LOGOUT_PATH: &str = "auth/logout/";
pub(crate) const CURRENT_USER_PATHS: [&str; 3] = ["auth/user/", "users/me/", "auth/me/"];

/// Authentication endpoint group.
#[derive(Debug, Clone, Copy)]
pub struct AuthEndpoints<'a> {
    client: &'a ApiClient,
}

impl<'a> AuthEndpoints<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// Exchange credentials for tokens.
    ///
    /// Tries the email/password endpoint, then the legacy username/password
    /// token endpoint. A success without an access token counts as a failure
    /// so the legacy endpoint still gets its turn.
    ///
    /// # Errors
    ///
    /// Returns the legacy endpoint's error when both fail.
    pub async fn login(&self, credentials: &LoginCredentials) -> ApiResult<AuthGrant> {
        let client = self.client;
        FallbackChain::new("login")
            .then("credential", move || async move {
                let descriptor = RequestDescriptor::post(LOGIN_PATH)
                    .anonymous()
                    .with_json(&credentials.email_body())?;
                require_tokens(LOGIN_PATH, client.send_json(descriptor).await?)
            })
            .then("legacy-token", move || async move {
                let descriptor = RequestDescriptor::post(TOKEN_PATH)
                    .anonymous()
                    .with_json(&credentials.username_body())?;
                require_tokens(TOKEN_PATH, client.send_json(descriptor).await?)
            })
            .run()
            .await
            .map_err(ApiError::from)
    }

    /// Create an account. The response may or may not open a session.
    ///
    /// # Errors
    ///
    /// Returns the normalized error of the registration call.
    pub async fn register(&self, registration: &Registration) -> ApiResult<AuthGrant> {
        let descriptor = RequestDescriptor::post(REGISTER_PATH)
            .anonymous()
            .with_json(registration)?;
        self.client.send_json(descriptor).await
    }

    /// Invalidate `refresh_token` server-side.
    ///
    /// # Errors
    ///
    /// Returns the normalized error of the logout call.
    pub async fn logout(&self, refresh_token: &str) -> ApiResult<()> {
        let descriptor = RequestDescriptor::post(LOGOUT_PATH)
            .with_json(&serde_json::json!({ "refresh": refresh_token }))?;
        self.client.send_unit(descriptor).await
    }

    /// Profile of the authenticated user, probing each known path in turn.
    ///
    /// # Errors
    ///
    /// Returns the last path's error when every path fails.
    pub async fn current_user(&self) -> ApiResult<User> {
        let client = self.client;
        CURRENT_USER_PATHS
            .into_iter()
            .fold(FallbackChain::<User>::new("current_user"), |chain, path| {
                chain.then(path, move || client.send_json(RequestDescriptor::get(path)))
            })
            .run()
            .await
            .map_err(ApiError::from)
    }

    /// Rotate the access token using the stored refresh token.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::refresh`].
    pub async fn refresh(&self) -> ApiResult<String> {
        self.client.refresh().await
    }
}

fn require_tokens(path: &str, grant: AuthGrant) -> ApiResult<AuthGrant> {
    if grant.tokens.is_some() {
        Ok(grant)
    } else {
        Err(ApiError::invalid_response(format!(
            "Unexpected response from {path}: no access token issued"
        )))
    }
}
