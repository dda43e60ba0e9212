//! Client policy and the ports it drives.
//!
//! Purpose: own every decision about sessions, authentication and failure
//! handling. Adapters for HTTP, storage and navigation live in
//! `crate::outbound` and are reached only through [`ports`].
//!
//! Public surface:
//! - ApiClient: request core and the single 401 refresh interceptor.
//! - MarketplaceService: façade used by marketplace views.
//! - SessionStore: the one reader and writer of persisted session slots.
//! - ApiError / ErrorCode: normalized failure shape.

pub mod api_client;
pub mod auth;
pub mod endpoints;
pub mod error;
pub mod fallback;
pub mod marketplace_service;
pub mod models;
pub mod normalization;
pub mod ports;
pub mod request;
pub mod session;
pub mod trace_id;

pub use self::api_client::ApiClient;
pub use self::auth::{
    AuthGrant, AuthSession, LoginCredentials, LoginValidationError, Registration,
    RegistrationOutcome, TokenPair,
};
pub use self::error::{ApiError, ApiErrorValidationError, ApiResult, ErrorCode};
pub use self::fallback::{FallbackAttempt, FallbackChain, FallbackFailure};
pub use self::marketplace_service::MarketplaceService;
pub use self::request::{AuthPolicy, HttpMethod, RequestDescriptor};
pub use self::session::{Session, SessionStore};
pub use self::trace_id::TraceId;
