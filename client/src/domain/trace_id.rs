//! Correlation id sent with every request in the `X-Trace-Id` header.
//!
//! Requests issued inside [`TraceId::scope`] share the scoped id, so a view
//! that fires several calls (and any refresh they trigger) can be followed
//! through the backend logs as one flow. Anything sent outside a scope gets
//! a fresh id. Task-locals do not cross `tokio::spawn`; re-enter the scope in
//! the spawned future.

use std::fmt;
use std::future::Future;
use std::str::FromStr;

use tokio::task_local;
use uuid::Uuid;

task_local! {
    static FLOW_TRACE_ID: TraceId;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TraceId(Uuid);

impl TraceId {
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Id of the enclosing flow, if any.
    #[must_use]
    pub fn current() -> Option<Self> {
        FLOW_TRACE_ID.try_with(|id| *id).ok()
    }

    /// Id of the enclosing flow, or a fresh one for a standalone request.
    #[must_use]
    pub fn current_or_generate() -> Self {
        Self::current().unwrap_or_else(Self::generate)
    }

    /// Run `flow` with every request inside it tagged with `trace_id`.
    ///
    /// ```
    /// use terrabia_client::TraceId;
    ///
    /// # tokio::runtime::Runtime::new().expect("runtime").block_on(async {
    /// let flow: TraceId = "7d0c6a5e-2f0b-4a55-9a6e-3c1d2b4f8e90".parse().expect("uuid");
    /// let seen = TraceId::scope(flow, async { TraceId::current_or_generate() }).await;
    /// assert_eq!(seen, flow);
    /// # });
    /// ```
    pub async fn scope<F: Future>(trace_id: TraceId, flow: F) -> F::Output {
        FLOW_TRACE_ID.scope(trace_id, flow).await
    }
}

impl From<Uuid> for TraceId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl fmt::Display for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for TraceId {
    type Err = uuid::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(value).map(Self)
    }
}
