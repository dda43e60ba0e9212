//! Behaviour tests for access-token refresh and session teardown.
//!
//! Scenarios run the real file-backed session store in a temporary
//! directory behind the scripted transport, so persistence across client
//! restarts is exercised as well as the interceptor itself.

use std::sync::Arc;
use std::time::Duration;

use rstest::fixture;
use rstest_bdd::Slot;
use rstest_bdd_macros::{ScenarioState, given, scenario, then, when};
use serde_json::json;
use tempfile::TempDir;
use terrabia_client::domain::models::Order;
use terrabia_client::domain::ports::{HttpResponse, SessionStorage};
use terrabia_client::domain::request::AUTHORIZATION;
use terrabia_client::domain::{
    ApiClient, ApiResult, ErrorCode, HttpMethod, MarketplaceService, SessionStore,
};
use terrabia_client::outbound::storage::FileSessionStorage;
use terrabia_client::test_support::{
    RecordingLoginBoundary, ScriptedTransport, temp_session_dir,
};
use tokio::runtime::Runtime;

const ORDERS_PATH: &str = "orders/";
const REFRESH_PATH: &str = "auth/token/refresh/";
const ACCESS_TOKEN_KEY: &str = "token";
const REFRESH_TOKEN_KEY: &str = "refresh_token";

#[derive(Clone)]
struct RuntimeHandle(Arc<Runtime>);

#[derive(Default, ScenarioState)]
struct SessionRefreshWorld {
    runtime: Slot<RuntimeHandle>,
    session_dir: Slot<Arc<TempDir>>,
    transport: Slot<Arc<ScriptedTransport>>,
    boundary: Slot<Arc<RecordingLoginBoundary>>,
    storage: Slot<Arc<FileSessionStorage>>,
    service: Slot<MarketplaceService>,
    last_result: Slot<ApiResult<Vec<Order>>>,
    concurrent_results: Slot<Vec<ApiResult<Vec<Order>>>>,
}

impl SessionRefreshWorld {
    fn start(&self, access: &str, refresh: Option<&str>) {
        let runtime = Runtime::new().expect("create runtime");
        let dir = temp_session_dir();
        let storage = FileSessionStorage::open(dir.path()).expect("open session directory");
        storage.set(ACCESS_TOKEN_KEY, access).expect("seed access token");
        if let Some(refresh) = refresh {
            storage
                .set(REFRESH_TOKEN_KEY, refresh)
                .expect("seed refresh token");
        }

        let transport = Arc::new(
            ScriptedTransport::new().with_latency(Duration::from_millis(10)),
        );
        self.runtime.set(RuntimeHandle(Arc::new(runtime)));
        self.session_dir.set(Arc::new(dir));
        self.transport.set(transport);
        self.connect(storage);
    }

    fn connect(&self, storage: FileSessionStorage) {
        let storage = Arc::new(storage);
        let boundary = Arc::new(RecordingLoginBoundary::elsewhere());
        let client = ApiClient::new(
            self.transport(),
            SessionStore::new(storage.clone()),
            boundary.clone(),
        );
        self.storage.set(storage);
        self.boundary.set(boundary);
        self.service.set(MarketplaceService::new(client));
    }

    fn restart(&self) {
        let dir = self.session_dir.get().expect("session directory should be set");
        let storage = FileSessionStorage::open(dir.path()).expect("reopen session directory");
        self.connect(storage);
    }

    fn runtime(&self) -> Arc<Runtime> {
        self.runtime.get().expect("runtime should be set").0
    }

    fn transport(&self) -> Arc<ScriptedTransport> {
        self.transport.get().expect("transport should be set")
    }

    fn service(&self) -> MarketplaceService {
        self.service.get().expect("service should be set")
    }

    fn slot(&self, key: &str) -> Option<String> {
        self.storage
            .get()
            .expect("storage should be set")
            .get(key)
            .expect("read session slot")
    }

    fn result(&self) -> ApiResult<Vec<Order>> {
        self.last_result.get().expect("a request should have run")
    }
}

#[fixture]
fn world() -> SessionRefreshWorld {
    SessionRefreshWorld::default()
}

#[given("a stored session with access token {access} and refresh token {refresh}")]
fn a_stored_session_with_tokens(world: &SessionRefreshWorld, access: String, refresh: String) {
    world.start(&access, Some(&refresh));
}

#[given("a stored session with access token {access} and no refresh token")]
fn a_stored_session_without_refresh_token(world: &SessionRefreshWorld, access: String) {
    world.start(&access, None);
}

#[given("the orders endpoint only accepts {token}")]
fn the_orders_endpoint_only_accepts(world: &SessionRefreshWorld, token: String) {
    let expected = format!("Bearer {token}");
    world
        .transport()
        .route(HttpMethod::Get, ORDERS_PATH, move |request| {
            if request.header(AUTHORIZATION) == Some(expected.as_str()) {
                HttpResponse::json(200, &json!([{ "id": 1, "status": "pending" }]))
            } else {
                HttpResponse::json(
                    401,
                    &json!({ "detail": "Given token not valid for any token type" }),
                )
            }
        });
}

#[given("the refresh endpoint issues {token}")]
fn the_refresh_endpoint_issues(world: &SessionRefreshWorld, token: String) {
    world
        .transport()
        .route(HttpMethod::Post, REFRESH_PATH, move |_| {
            HttpResponse::json(200, &json!({ "access": token }))
        });
}

#[given("the refresh endpoint rejects the refresh token")]
fn the_refresh_endpoint_rejects(world: &SessionRefreshWorld) {
    world
        .transport()
        .route(HttpMethod::Post, REFRESH_PATH, |_| {
            HttpResponse::json(401, &json!({ "detail": "Token is blacklisted" }))
        });
}

#[when("the orders are requested")]
fn the_orders_are_requested(world: &SessionRefreshWorld) {
    let service = world.service();
    let result = world.runtime().block_on(service.orders());
    world.last_result.set(result);
}

#[when("{count} order requests are sent concurrently")]
fn order_requests_are_sent_concurrently(world: &SessionRefreshWorld, count: usize) {
    let service = world.service();
    let results = world.runtime().block_on(futures::future::join_all(
        (0..count).map(|_| service.orders()),
    ));
    world.concurrent_results.set(results);
}

#[when("the client is restarted")]
fn the_client_is_restarted(world: &SessionRefreshWorld) {
    world.restart();
}

#[then("the request succeeds")]
fn the_request_succeeds(world: &SessionRefreshWorld) {
    let orders = world.result().expect("request should succeed");
    assert_eq!(orders.len(), 1);
}

#[then("every concurrent request succeeds")]
fn every_concurrent_request_succeeds(world: &SessionRefreshWorld) {
    let results = world
        .concurrent_results
        .get()
        .expect("concurrent results should be set");
    assert!(!results.is_empty());
    for result in results {
        result.expect("concurrent request should succeed");
    }
}

#[then("the request fails because the session expired")]
fn the_request_fails_because_the_session_expired(world: &SessionRefreshWorld) {
    let error = world.result().expect_err("request should fail");
    assert_eq!(error.code(), ErrorCode::SessionExpired);
    assert_eq!(error.status(), Some(401));
}

#[then("the stored access token is {token}")]
fn the_stored_access_token_is(world: &SessionRefreshWorld, token: String) {
    assert_eq!(world.slot(ACCESS_TOKEN_KEY), Some(token));
}

#[then("the session file holds no tokens")]
fn the_session_file_holds_no_tokens(world: &SessionRefreshWorld) {
    assert!(world.slot(ACCESS_TOKEN_KEY).is_none());
    assert!(world.slot(REFRESH_TOKEN_KEY).is_none());
}

#[then("the refresh endpoint was called {count} times")]
fn the_refresh_endpoint_was_called(world: &SessionRefreshWorld, count: usize) {
    assert_eq!(
        world
            .transport()
            .requests_to(HttpMethod::Post, REFRESH_PATH)
            .len(),
        count
    );
}

#[then("the shell is sent to the login view")]
fn the_shell_is_sent_to_the_login_view(world: &SessionRefreshWorld) {
    let boundary = world.boundary.get().expect("boundary should be set");
    assert_eq!(boundary.redirects(), 1);
}

#[then("the shell stays where it is")]
fn the_shell_stays_where_it_is(world: &SessionRefreshWorld) {
    let boundary = world.boundary.get().expect("boundary should be set");
    assert_eq!(boundary.redirects(), 0);
}

#[then("the last orders request carried {token}")]
fn the_last_orders_request_carried(world: &SessionRefreshWorld, token: String) {
    let requests = world.transport().requests_to(HttpMethod::Get, ORDERS_PATH);
    let last = requests.last().expect("an orders request should be recorded");
    assert_eq!(
        last.header(AUTHORIZATION),
        Some(format!("Bearer {token}").as_str())
    );
}

#[scenario(
    path = "tests/features/session_refresh.feature",
    name = "Expired access token is refreshed transparently"
)]
fn expired_access_token_is_refreshed_transparently(world: SessionRefreshWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/session_refresh.feature",
    name = "Rejected refresh ends the session"
)]
fn rejected_refresh_ends_the_session(world: SessionRefreshWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/session_refresh.feature",
    name = "Missing refresh token ends the session without a refresh call"
)]
fn missing_refresh_token_ends_the_session(world: SessionRefreshWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/session_refresh.feature",
    name = "Concurrent rejected requests share one refresh"
)]
fn concurrent_rejected_requests_share_one_refresh(world: SessionRefreshWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/session_refresh.feature",
    name = "Refreshed session survives a restart"
)]
fn refreshed_session_survives_a_restart(world: SessionRefreshWorld) {
    drop(world);
}
