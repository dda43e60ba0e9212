//! File-backed session slots.
//!
//! All slots live in one JSON object inside a directory opened through
//! `cap-std`, so the adapter cannot touch anything outside that directory.
//! Every write stages a sibling file and renames it over the original, which
//! keeps the file whole if the process dies mid-write. A file that no longer
//! decodes reads as empty and is replaced by the next write.

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use cap_std::{ambient_authority, fs::Dir};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::domain::ports::{SessionStorage, SessionStorageError};

/// Name of the session file inside the session directory.
pub const SESSION_FILE_NAME: &str = "session.json";

type Slots = BTreeMap<String, String>;

/// Session storage persisted as `session.json` in one directory.
#[derive(Debug)]
pub struct FileSessionStorage {
    directory: Dir,
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileSessionStorage {
    /// Open (creating if necessary) the session directory at `directory`.
    ///
    /// # Errors
    ///
    /// Returns an I/O error when the directory cannot be created or opened.
    pub fn open(directory: &Path) -> io::Result<Self> {
        Dir::create_ambient_dir_all(directory, ambient_authority())?;
        let handle = Dir::open_ambient_dir(directory, ambient_authority())?;
        Ok(Self {
            directory: handle,
            path: directory.join(SESSION_FILE_NAME),
            write_lock: Mutex::new(()),
        })
    }

    /// Location of the session file, for diagnostics.
    pub fn path(&self) -> &Path {
        self.path.as_path()
    }

    fn load(&self) -> Result<Slots, SessionStorageError> {
        let raw = match self.directory.read_to_string(SESSION_FILE_NAME) {
            Ok(raw) => raw,
            Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(Slots::new()),
            Err(error) => return Err(self.unavailable(&error)),
        };
        if raw.trim().is_empty() {
            return Ok(Slots::new());
        }
        serde_json::from_str(&raw).map_err(|error| {
            SessionStorageError::corrupt(format!("{}: {error}", self.path.display()))
        })
    }

    /// Current slots, treating an undecodable file as empty.
    ///
    /// The flag reports whether the file was discarded, so the caller can
    /// rewrite it even when its own mutation is a no-op.
    fn load_lenient(&self) -> Result<(Slots, bool), SessionStorageError> {
        match self.load() {
            Ok(slots) => Ok((slots, false)),
            Err(SessionStorageError::Corrupt { message }) => {
                warn!(%message, "discarding undecodable session file");
                Ok((Slots::new(), true))
            }
            Err(error) => Err(error),
        }
    }

    fn store(&self, slots: &Slots) -> Result<(), SessionStorageError> {
        let encoded = serde_json::to_vec_pretty(slots)
            .map_err(|error| SessionStorageError::corrupt(error.to_string()))?;
        let staging = format!(".{SESSION_FILE_NAME}.tmp-{}", Uuid::new_v4().simple());
        self.directory
            .write(&staging, &encoded)
            .map_err(|error| self.unavailable(&error))?;
        if let Err(error) = self
            .directory
            .rename(&staging, &self.directory, SESSION_FILE_NAME)
        {
            let _cleanup_result = self.directory.remove_file(&staging);
            return Err(self.unavailable(&error));
        }
        debug!(path = %self.path.display(), slots = slots.len(), "session file written");
        Ok(())
    }

    fn update<F>(&self, mutate: F) -> Result<(), SessionStorageError>
    where
        F: FnOnce(&mut Slots) -> bool,
    {
        let _guard = self.lock()?;
        let (mut slots, discarded) = self.load_lenient()?;
        if mutate(&mut slots) || discarded {
            self.store(&slots)?;
        }
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, ()>, SessionStorageError> {
        self.write_lock
            .lock()
            .map_err(|_| SessionStorageError::unavailable("session file lock poisoned"))
    }

    fn unavailable(&self, error: &io::Error) -> SessionStorageError {
        SessionStorageError::unavailable(format!("{}: {error}", self.path.display()))
    }
}

impl SessionStorage for FileSessionStorage {
    fn get(&self, key: &str) -> Result<Option<String>, SessionStorageError> {
        Ok(self.load_lenient()?.0.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), SessionStorageError> {
        self.update(|slots| {
            let previous = slots.insert(key.to_owned(), value.to_owned());
            previous.as_deref() != Some(value)
        })
    }

    fn remove(&self, key: &str) -> Result<(), SessionStorageError> {
        self.update(|slots| slots.remove(key).is_some())
    }
}
