//! The single authority over persisted session state.
//!
//! All token and cached-profile reads and writes go through [`SessionStore`],
//! which keeps nothing in memory of its own: the storage port is the only
//! copy, so the façade, the interceptor, and any UI observer never drift.

use std::sync::Arc;

use tracing::warn;

use crate::domain::models::User;
use crate::domain::ports::{SessionStorage, SessionStorageError};

/// Storage key holding the access token.
pub const ACCESS_TOKEN_KEY: &str = "token";
/// Storage key holding the refresh token.
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";
/// Storage key holding the serialized cached profile.
pub const USER_KEY: &str = "user";
/// Retired profile key; migrated into [`USER_KEY`] on first read.
pub const LEGACY_USER_KEY: &str = "terrabia_user";

/// Point-in-time view of the session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub cached_user: Option<User>,
}

impl Session {
    /// A session is authenticated only when it holds an access token,
    /// whatever the cached profile says.
    pub fn is_authenticated(&self) -> bool {
        self.access_token.is_some()
    }
}

/// Accessors over the persisted session slots.
///
/// # Examples
/// ```
/// use std::sync::Arc;
/// use terrabia_client::domain::SessionStore;
/// use terrabia_client::domain::ports::InMemorySessionStorage;
///
/// let store = SessionStore::new(Arc::new(InMemorySessionStorage::default()));
/// store.set_tokens("a", Some("r"))?;
/// assert_eq!(store.access_token()?.as_deref(), Some("a"));
/// assert_eq!(store.refresh_token()?.as_deref(), Some("r"));
/// store.clear()?;
/// assert!(store.access_token()?.is_none());
/// # Ok::<(), terrabia_client::domain::ports::SessionStorageError>(())
/// ```
#[derive(Clone)]
pub struct SessionStore {
    storage: Arc<dyn SessionStorage>,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore").finish_non_exhaustive()
    }
}

impl SessionStore {
    /// Wrap a storage adapter.
    pub fn new(storage: Arc<dyn SessionStorage>) -> Self {
        Self { storage }
    }

    /// Current access token.
    pub fn access_token(&self) -> Result<Option<String>, SessionStorageError> {
        self.read_non_blank(ACCESS_TOKEN_KEY)
    }

    /// Current refresh token.
    pub fn refresh_token(&self) -> Result<Option<String>, SessionStorageError> {
        self.read_non_blank(REFRESH_TOKEN_KEY)
    }

    /// Store a new token pair. A `None` refresh token keeps the existing one.
    pub fn set_tokens(
        &self,
        access_token: &str,
        refresh_token: Option<&str>,
    ) -> Result<(), SessionStorageError> {
        self.storage.set(ACCESS_TOKEN_KEY, access_token)?;
        if let Some(refresh_token) = refresh_token {
            self.storage.set(REFRESH_TOKEN_KEY, refresh_token)?;
        }
        Ok(())
    }

    /// Start a new session from a fresh grant.
    ///
    /// Every slot of the previous session goes first, so a grant without a
    /// refresh token never inherits the old one.
    pub fn replace_tokens(
        &self,
        access_token: &str,
        refresh_token: Option<&str>,
    ) -> Result<(), SessionStorageError> {
        self.clear()?;
        self.set_tokens(access_token, refresh_token)
    }

    /// Rotate only the access token.
    pub fn set_access_token(&self, access_token: &str) -> Result<(), SessionStorageError> {
        self.storage.set(ACCESS_TOKEN_KEY, access_token)
    }

    /// Remove both tokens, leaving the cached profile in place.
    pub fn clear_tokens(&self) -> Result<(), SessionStorageError> {
        self.storage.remove(ACCESS_TOKEN_KEY)?;
        self.storage.remove(REFRESH_TOKEN_KEY)
    }

    /// Cached profile, migrating the legacy key when necessary.
    ///
    /// A profile that no longer decodes is dropped and reported as absent.
    pub fn cached_user(&self) -> Result<Option<User>, SessionStorageError> {
        let raw = match self.storage.get(USER_KEY)? {
            Some(raw) => raw,
            None => match self.storage.get(LEGACY_USER_KEY)? {
                Some(raw) => {
                    self.storage.set(USER_KEY, &raw)?;
                    self.storage.remove(LEGACY_USER_KEY)?;
                    raw
                }
                None => return Ok(None),
            },
        };

        match serde_json::from_str::<User>(&raw) {
            Ok(user) => Ok(Some(user)),
            Err(error) => {
                warn!(%error, "discarding undecodable cached user");
                self.storage.remove(USER_KEY)?;
                Ok(None)
            }
        }
    }

    /// Replace the cached profile.
    pub fn set_cached_user(&self, user: &User) -> Result<(), SessionStorageError> {
        let encoded = serde_json::to_string(user)
            .map_err(|error| SessionStorageError::corrupt(error.to_string()))?;
        self.storage.set(USER_KEY, &encoded)
    }

    /// Destroy the whole session, including the legacy profile key.
    pub fn clear(&self) -> Result<(), SessionStorageError> {
        for key in [
            ACCESS_TOKEN_KEY,
            REFRESH_TOKEN_KEY,
            USER_KEY,
            LEGACY_USER_KEY,
        ] {
            self.storage.remove(key)?;
        }
        Ok(())
    }

    /// Whether an access token is present.
    pub fn is_authenticated(&self) -> Result<bool, SessionStorageError> {
        Ok(self.access_token()?.is_some())
    }

    /// Read every slot at once.
    pub fn snapshot(&self) -> Result<Session, SessionStorageError> {
        Ok(Session {
            access_token: self.access_token()?,
            refresh_token: self.refresh_token()?,
            cached_user: self.cached_user()?,
        })
    }

    fn read_non_blank(&self, key: &str) -> Result<Option<String>, SessionStorageError> {
        Ok(self
            .storage
            .get(key)?
            .filter(|value| !value.trim().is_empty()))
    }
}
