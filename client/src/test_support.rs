//! Test utilities for the client crate.
//!
//! Shared by unit tests (in `src/`) and integration tests (in `tests/`).
//! Compiled for tests and when the `test-support` feature is enabled.

use std::collections::{BTreeMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};

use crate::domain::ports::{
    HttpResponse, HttpTransport, InMemorySessionStorage, LoginBoundary, TransportError,
};
use crate::domain::request::{HttpMethod, PreparedRequest};
use crate::domain::session::{ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY};

type Handler = Arc<dyn Fn(&PreparedRequest) -> HttpResponse + Send + Sync>;

/// One scripted outcome for a queued route.
#[derive(Debug, Clone)]
pub enum ScriptedReply {
    Respond(HttpResponse),
    Fail(TransportError),
    /// Never resolves; used to exercise cancellation.
    Hang,
}

#[derive(Default)]
struct Route {
    queue: VecDeque<ScriptedReply>,
    handler: Option<Handler>,
}

/// Transport double that replays scripted replies per `(method, path)` and
/// records every request it receives.
///
/// Queued replies are consumed first; once a route's queue is empty its
/// handler (if any) answers. Unscripted routes answer `404`.
#[derive(Default)]
pub struct ScriptedTransport {
    routes: Mutex<BTreeMap<(HttpMethod, String), Route>>,
    requests: Mutex<Vec<PreparedRequest>>,
    latency: Option<Duration>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every reply so concurrent callers overlap.
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Queue a JSON reply.
    pub fn push_json(&self, method: HttpMethod, path: &str, status: u16, body: Value) {
        self.push(method, path, ScriptedReply::Respond(HttpResponse::json(status, &body)));
    }

    /// Queue an arbitrary reply.
    pub fn push(&self, method: HttpMethod, path: &str, reply: ScriptedReply) {
        self.lock_routes()
            .entry((method, path.to_owned()))
            .or_default()
            .queue
            .push_back(reply);
    }

    /// Answer every otherwise unqueued request on the route with `handler`.
    pub fn route<F>(&self, method: HttpMethod, path: &str, handler: F)
    where
        F: Fn(&PreparedRequest) -> HttpResponse + Send + Sync + 'static,
    {
        self.lock_routes()
            .entry((method, path.to_owned()))
            .or_default()
            .handler = Some(Arc::new(handler));
    }

    /// Every request received so far, in arrival order.
    pub fn requests(&self) -> Vec<PreparedRequest> {
        self.lock_requests().clone()
    }

    /// Requests received on one route.
    pub fn requests_to(&self, method: HttpMethod, path: &str) -> Vec<PreparedRequest> {
        self.lock_requests()
            .iter()
            .filter(|request| request.method == method && request.path == path)
            .cloned()
            .collect()
    }

    fn next_reply(&self, request: &PreparedRequest) -> ScriptedReply {
        let mut routes = self.lock_routes();
        let Some(route) = routes.get_mut(&(request.method, request.path.clone())) else {
            return unscripted(request);
        };
        if let Some(reply) = route.queue.pop_front() {
            return reply;
        }
        match &route.handler {
            Some(handler) => ScriptedReply::Respond(handler(request)),
            None => unscripted(request),
        }
    }

    fn lock_routes(&self) -> MutexGuard<'_, BTreeMap<(HttpMethod, String), Route>> {
        match self.routes.lock() {
            Ok(guard) => guard,
            Err(_) => panic!("scripted routes mutex"),
        }
    }

    fn lock_requests(&self) -> MutexGuard<'_, Vec<PreparedRequest>> {
        match self.requests.lock() {
            Ok(guard) => guard,
            Err(_) => panic!("scripted requests mutex"),
        }
    }
}

fn unscripted(request: &PreparedRequest) -> ScriptedReply {
    ScriptedReply::Respond(HttpResponse::json(
        404,
        &json!({ "detail": format!("no scripted reply for {} {}", request.method, request.path) }),
    ))
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn send(&self, request: PreparedRequest) -> Result<HttpResponse, TransportError> {
        self.lock_requests().push(request.clone());
        let reply = self.next_reply(&request);
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        match reply {
            ScriptedReply::Respond(response) => Ok(response),
            ScriptedReply::Fail(error) => Err(error),
            ScriptedReply::Hang => std::future::pending().await,
        }
    }
}

/// Login boundary double that counts redirects.
#[derive(Debug, Default)]
pub struct RecordingLoginBoundary {
    at_login: AtomicBool,
    redirects: AtomicUsize,
}

impl RecordingLoginBoundary {
    /// Boundary positioned somewhere other than the login view.
    pub fn elsewhere() -> Self {
        Self::default()
    }

    /// Boundary already showing the login view.
    pub fn at_login() -> Self {
        Self {
            at_login: AtomicBool::new(true),
            redirects: AtomicUsize::new(0),
        }
    }

    /// Number of redirects requested.
    pub fn redirects(&self) -> usize {
        self.redirects.load(Ordering::SeqCst)
    }
}

impl LoginBoundary for RecordingLoginBoundary {
    fn is_at_login(&self) -> bool {
        self.at_login.load(Ordering::SeqCst)
    }

    fn redirect_to_login(&self) {
        self.redirects.fetch_add(1, Ordering::SeqCst);
        self.at_login.store(true, Ordering::SeqCst);
    }
}

/// In-memory storage pre-populated with a token pair.
pub fn storage_with_tokens(access: &str, refresh: Option<&str>) -> Arc<InMemorySessionStorage> {
    let mut entries = vec![(ACCESS_TOKEN_KEY, access)];
    if let Some(refresh) = refresh {
        entries.push((REFRESH_TOKEN_KEY, refresh));
    }
    Arc::new(InMemorySessionStorage::with_entries(entries))
}

pub mod cap_fs {
    //! Capability-scoped filesystem helpers for session file tests.

    use std::io;
    use std::path::Path;

    use cap_std::{ambient_authority, fs::Dir};

    /// Write `contents` to `file_name` inside `directory`.
    pub fn write_file(directory: &Path, file_name: &str, contents: &[u8]) -> io::Result<()> {
        Dir::open_ambient_dir(directory, ambient_authority())?.write(file_name, contents)
    }

    /// Whether `file_name` exists inside `directory`.
    pub fn file_exists(directory: &Path, file_name: &str) -> bool {
        Dir::open_ambient_dir(directory, ambient_authority())
            .is_ok_and(|handle| handle.exists(file_name))
    }

    /// Names of the entries in `directory`, sorted.
    pub fn file_names(directory: &Path) -> io::Result<Vec<String>> {
        let handle = Dir::open_ambient_dir(directory, ambient_authority())?;
        let mut names = handle
            .entries()?
            .map(|entry| entry.map(|entry| entry.file_name().to_string_lossy().into_owned()))
            .collect::<io::Result<Vec<_>>>()?;
        names.sort();
        Ok(names)
    }
}

/// Fresh temporary directory for file-backed session tests.
pub fn temp_session_dir() -> tempfile::TempDir {
    match tempfile::tempdir() {
        Ok(dir) => dir,
        Err(error) => panic!("temporary session directory: {error}"),
    }
}
