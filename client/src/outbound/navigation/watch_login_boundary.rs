//! Login boundary backed by a `tokio::sync::watch` channel.
//!
//! The shell publishes its current location with [`WatchLoginBoundary::navigate`]
//! and observes forced redirects through [`WatchLoginBoundary::subscribe`].

use tokio::sync::watch;
use tracing::info;

/// Path of the login view when none is configured.
pub const DEFAULT_LOGIN_PATH: &str = "/login";

/// Shell location tracker that doubles as the client's login boundary.
#[derive(Debug)]
pub struct WatchLoginBoundary {
    login_path: String,
    location: watch::Sender<String>,
}

impl WatchLoginBoundary {
    /// Create a boundary positioned at `initial_location`.
    pub fn new(login_path: impl Into<String>, initial_location: impl Into<String>) -> Self {
        let (location, _receiver) = watch::channel(initial_location.into());
        Self {
            login_path: login_path.into(),
            location,
        }
    }

    /// Login path this boundary redirects to.
    pub fn login_path(&self) -> &str {
        self.login_path.as_str()
    }

    /// Record that the shell moved to `location`.
    pub fn navigate(&self, location: impl Into<String>) {
        self.location.send_replace(location.into());
    }

    /// Current shell location.
    pub fn current(&self) -> String {
        self.location.borrow().clone()
    }

    /// Receiver notified on every navigation, including forced redirects.
    pub fn subscribe(&self) -> watch::Receiver<String> {
        self.location.subscribe()
    }
}

impl crate::domain::ports::LoginBoundary for WatchLoginBoundary {
    fn is_at_login(&self) -> bool {
        let current = self.location.borrow();
        current.trim_end_matches('/') == self.login_path.trim_end_matches('/')
    }

    fn redirect_to_login(&self) {
        info!(from = %self.current(), to = %self.login_path, "redirecting to login");
        self.location.send_replace(self.login_path.clone());
    }
}
