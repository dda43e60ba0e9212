//! Driven port for the persisted session slot.
//!
//! Semantically a string-to-string map that survives process restarts until
//! explicitly cleared. Writes are last-write-wins.

use std::collections::BTreeMap;
use std::sync::Mutex;

use super::define_port_error;

define_port_error! {
    /// Errors raised by session storage adapters.
    pub enum SessionStorageError {
        /// The backing store could not be read or written.
        Unavailable { message: String } =>
            "session storage unavailable: {message}",
        /// The stored data could not be decoded.
        Corrupt { message: String } =>
            "session storage corrupt: {message}",
    }
}

/// Port for reading and writing persisted session slots.
#[cfg_attr(test, mockall::automock)]
pub trait SessionStorage: Send + Sync {
    /// Read the value stored under `key`.
    fn get(&self, key: &str) -> Result<Option<String>, SessionStorageError>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<(), SessionStorageError>;

    /// Remove `key`. Removing an absent key is not an error.
    fn remove(&self, key: &str) -> Result<(), SessionStorageError>;
}

/// Process-local storage used for tests and ephemeral sessions.
///
/// # Examples
/// ```
/// use terrabia_client::domain::ports::{InMemorySessionStorage, SessionStorage};
///
/// let storage = InMemorySessionStorage::default();
/// storage.set("token", "abc")?;
/// assert_eq!(storage.get("token")?.as_deref(), Some("abc"));
/// storage.remove("token")?;
/// assert!(storage.get("token")?.is_none());
/// # Ok::<(), terrabia_client::domain::ports::SessionStorageError>(())
/// ```
#[derive(Debug, Default)]
pub struct InMemorySessionStorage {
    slots: Mutex<BTreeMap<String, String>>,
}

impl InMemorySessionStorage {
    /// Build a store pre-populated with `entries`.
    pub fn with_entries<'a>(entries: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let slots = entries
            .into_iter()
            .map(|(key, value)| (key.to_owned(), value.to_owned()))
            .collect();
        Self {
            slots: Mutex::new(slots),
        }
    }

    fn with_slots<T>(
        &self,
        f: impl FnOnce(&mut BTreeMap<String, String>) -> T,
    ) -> Result<T, SessionStorageError> {
        let mut guard = self
            .slots
            .lock()
            .map_err(|_| SessionStorageError::unavailable("in-memory session lock poisoned"))?;
        Ok(f(&mut guard))
    }
}

impl SessionStorage for InMemorySessionStorage {
    fn get(&self, key: &str) -> Result<Option<String>, SessionStorageError> {
        self.with_slots(|slots| slots.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), SessionStorageError> {
        self.with_slots(|slots| {
            slots.insert(key.to_owned(), value.to_owned());
        })
    }

    fn remove(&self, key: &str) -> Result<(), SessionStorageError> {
        self.with_slots(|slots| {
            slots.remove(key);
        })
    }
}
