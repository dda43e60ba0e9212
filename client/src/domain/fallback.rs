//! Ordered candidate probing for endpoints the backend exposes inconsistently.
//!
//! A chain evaluates candidates in order and returns the first success.
//! Every failure is captured; when all candidates fail, the last candidate's
//! error is surfaced. Terminal errors (cancellation, expired session) end the
//! chain immediately since no other endpoint can recover from them.

use std::future::Future;

use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use tracing::debug;

use crate::domain::error::{ApiError, ApiResult};

type Candidate<'a, T> = Box<dyn FnOnce() -> BoxFuture<'a, ApiResult<T>> + Send + 'a>;

/// One failed candidate.
#[derive(Debug, Clone, PartialEq)]
pub struct FallbackAttempt {
    pub label: &'static str,
    pub error: ApiError,
}

/// Every candidate failed, or a terminal error stopped the chain.
#[derive(Debug, Clone, PartialEq)]
pub struct FallbackFailure {
    operation: &'static str,
    attempts: Vec<FallbackAttempt>,
}

impl FallbackFailure {
    /// Name of the logical operation that was probed.
    pub fn operation(&self) -> &'static str {
        self.operation
    }

    /// Failures in evaluation order.
    pub fn attempts(&self) -> &[FallbackAttempt] {
        &self.attempts
    }

    /// Error of the last candidate evaluated.
    pub fn last_error(&self) -> Option<&ApiError> {
        self.attempts.last().map(|attempt| &attempt.error)
    }

    /// Collapse into the error surfaced to callers.
    pub fn into_error(self) -> ApiError {
        let operation = self.operation;
        self.attempts
            .into_iter()
            .last()
            .map(|attempt| attempt.error)
            .unwrap_or_else(|| {
                ApiError::configuration(format!("no endpoint configured for {operation}"))
            })
    }
}

impl From<FallbackFailure> for ApiError {
    fn from(value: FallbackFailure) -> Self {
        value.into_error()
    }
}

/// Builder and evaluator for a fallback sequence.
///
/// # Examples
/// ```
/// use terrabia_client::domain::{ApiError, ErrorCode, FallbackChain};
///
/// # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
/// let value = FallbackChain::new("probe")
///     .then("primary", || async { Err(ApiError::new(ErrorCode::NotFound, "missing")) })
///     .then("secondary", || async { Ok(7) })
///     .run()
///     .await
///     .expect("secondary succeeds");
/// assert_eq!(value, 7);
/// # });
/// ```
pub struct FallbackChain<'a, T> {
    operation: &'static str,
    candidates: Vec<(&'static str, Candidate<'a, T>)>,
}

impl<'a, T: Send + 'a> FallbackChain<'a, T> {
    /// Start an empty chain for `operation`.
    pub fn new(operation: &'static str) -> Self {
        Self {
            operation,
            candidates: Vec::new(),
        }
    }

    /// Append a candidate.
    #[must_use]
    pub fn then<F, Fut>(mut self, label: &'static str, candidate: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'a,
        Fut: Future<Output = ApiResult<T>> + Send + 'a,
    {
        self.candidates
            .push((label, Box::new(move || candidate().boxed())));
        self
    }

    /// Evaluate candidates in order.
    ///
    /// # Errors
    ///
    /// Returns every captured failure when no candidate succeeds.
    pub async fn run(self) -> Result<T, FallbackFailure> {
        let mut attempts = Vec::with_capacity(self.candidates.len());
        for (label, candidate) in self.candidates {
            match candidate().await {
                Ok(value) => return Ok(value),
                Err(error) => {
                    debug!(
                        operation = self.operation,
                        candidate = label,
                        code = ?error.code(),
                        "fallback candidate failed"
                    );
                    let terminal = error.is_terminal();
                    attempts.push(FallbackAttempt { label, error });
                    if terminal {
                        break;
                    }
                }
            }
        }
        Err(FallbackFailure {
            operation: self.operation,
            attempts,
        })
    }
}
