//! Driven port for the navigation shell's login boundary.
//!
//! When a session cannot be recovered the client forces the shell back to
//! the login view, unless the shell is already showing it.

/// Port for observing and forcing navigation to the login boundary.
#[cfg_attr(test, mockall::automock)]
pub trait LoginBoundary: Send + Sync {
    /// Whether the shell is currently positioned at the login boundary.
    fn is_at_login(&self) -> bool;

    /// Navigate to the login boundary.
    fn redirect_to_login(&self);
}

/// Headless boundary that is never displaced and ignores redirects.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureLoginBoundary;

impl LoginBoundary for FixtureLoginBoundary {
    fn is_at_login(&self) -> bool {
        true
    }

    fn redirect_to_login(&self) {}
}
