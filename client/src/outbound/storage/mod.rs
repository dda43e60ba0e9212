//! Session storage adapters.

mod file_session_storage;

pub use file_session_storage::{FileSessionStorage, SESSION_FILE_NAME};
