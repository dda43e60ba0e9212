//! Client configuration loaded via OrthoConfig.
//!
//! Every field is optional; accessors apply the defaults so callers never
//! see an unset value.

use std::path::PathBuf;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use url::Url;

use crate::outbound::navigation::DEFAULT_LOGIN_PATH;

/// API root used when no base URL is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api/";
/// Per-request timeout applied by the HTTP transport.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
/// Directory holding `session.json` when none is configured.
pub const DEFAULT_SESSION_DIR: &str = ".terrabia";

fn default_user_agent() -> String {
    format!("terrabia-client/{}", env!("CARGO_PKG_VERSION"))
}

/// Errors raised while interpreting loaded settings.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    /// The configured base URL does not parse.
    #[error("invalid base URL {value:?}: {message}")]
    InvalidBaseUrl { value: String, message: String },
    /// The configured base URL cannot carry relative paths.
    #[error("base URL {value:?} cannot be used as an API root")]
    OpaqueBaseUrl { value: String },
    /// A zero timeout would fail every request.
    #[error("request timeout must be at least one second")]
    ZeroTimeout,
}

/// Connection and session settings for the marketplace client.
#[derive(Debug, Clone, Default, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "TERRABIA")]
pub struct ClientSettings {
    /// Root URL of the marketplace API.
    pub base_url: Option<String>,
    /// Per-request timeout in seconds.
    pub request_timeout_secs: Option<u64>,
    /// Path of the login view in the navigation shell.
    pub login_path: Option<String>,
    /// Directory holding the persisted session file.
    pub session_dir: Option<PathBuf>,
    /// User agent reported to the API.
    pub user_agent: Option<String>,
}

impl ClientSettings {
    /// Return the configured API root, falling back to the default.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError`] when the value is not an absolute
    /// hierarchical URL.
    pub fn base_url(&self) -> Result<Url, SettingsError> {
        let raw = self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL);
        let url = Url::parse(raw).map_err(|error| SettingsError::InvalidBaseUrl {
            value: raw.to_owned(),
            message: error.to_string(),
        })?;
        if url.cannot_be_a_base() {
            return Err(SettingsError::OpaqueBaseUrl {
                value: raw.to_owned(),
            });
        }
        Ok(url)
    }

    /// Return the configured request timeout, falling back to the default.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::ZeroTimeout`] for a zero timeout.
    pub fn request_timeout(&self) -> Result<Duration, SettingsError> {
        match self
            .request_timeout_secs
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS)
        {
            0 => Err(SettingsError::ZeroTimeout),
            secs => Ok(Duration::from_secs(secs)),
        }
    }

    /// Return the login view path, falling back to the default.
    pub fn login_path(&self) -> &str {
        self.login_path.as_deref().unwrap_or(DEFAULT_LOGIN_PATH)
    }

    /// Return the session directory, falling back to the default.
    pub fn session_dir(&self) -> PathBuf {
        self.session_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SESSION_DIR))
    }

    /// Return the user agent, falling back to the crate name and version.
    pub fn user_agent(&self) -> String {
        self.user_agent.clone().unwrap_or_else(default_user_agent)
    }
}
