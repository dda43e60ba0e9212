//! Navigation-shell adapters.

mod watch_login_boundary;

pub use watch_login_boundary::{DEFAULT_LOGIN_PATH, WatchLoginBoundary};
