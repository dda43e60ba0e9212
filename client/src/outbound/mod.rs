//! Outbound adapters implementing the domain ports.
//!
//! - **http**: reqwest-backed [`HttpTransport`](crate::domain::ports::HttpTransport)
//! - **storage**: file-backed session slots opened through `cap-std`
//! - **navigation**: a watch-channel login boundary a shell can observe
//!
//! Adapters translate between domain types and infrastructure types. They
//! contain no session or retry policy.

pub mod http;
pub mod navigation;
pub mod storage;
