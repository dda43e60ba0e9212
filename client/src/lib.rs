//! Authenticated API client for the Terrabia marketplace.
//!
//! The crate is split the same way as a hexagonal service: `domain` owns the
//! request policy (bearer injection, refresh-and-retry, error normalization,
//! fallback probing) and talks to the outside world through ports;
//! `outbound` provides the reqwest transport, session storage, and
//! login-boundary adapters.

pub mod config;
pub mod domain;
pub mod outbound;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use domain::TraceId;
