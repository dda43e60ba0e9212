//! Interceptor behaviour: bearer injection, the one-shot refresh, teardown,
//! refresh coalescing and cancellation.

use std::sync::Arc;
use std::time::Duration;

use rstest::rstest;
use serde_json::{Value, json};
use tokio_util::sync::CancellationToken;

use super::*;
use crate::domain::endpoints::auth::REFRESH_PATH;
use crate::domain::normalization::CONNECTIVITY_MESSAGE;
use crate::domain::ports::{InMemorySessionStorage, SessionStorage, TransportError};
use crate::domain::request::{AUTHORIZATION, HttpMethod, RequestBody};
use crate::domain::session::{ACCESS_TOKEN_KEY, LEGACY_USER_KEY, REFRESH_TOKEN_KEY, USER_KEY};
use crate::test_support::{
    RecordingLoginBoundary, ScriptedReply, ScriptedTransport, storage_with_tokens,
};

const ORDERS: &str = "orders/";

struct Harness {
    transport: Arc<ScriptedTransport>,
    storage: Arc<InMemorySessionStorage>,
    boundary: Arc<RecordingLoginBoundary>,
    client: ApiClient,
}

impl Harness {
    fn new(
        transport: ScriptedTransport,
        storage: Arc<InMemorySessionStorage>,
        boundary: RecordingLoginBoundary,
    ) -> Self {
        let transport = Arc::new(transport);
        let boundary = Arc::new(boundary);
        let client = ApiClient::new(
            transport.clone(),
            SessionStore::new(storage.clone()),
            boundary.clone(),
        );
        Self {
            transport,
            storage,
            boundary,
            client,
        }
    }

    fn signed_in(access: &str, refresh: Option<&str>) -> Self {
        Self::new(
            ScriptedTransport::new(),
            storage_with_tokens(access, refresh),
            RecordingLoginBoundary::elsewhere(),
        )
    }

    fn slot(&self, key: &str) -> Option<String> {
        self.storage.get(key).expect("read slot")
    }

    fn bearer_of(&self, index: usize) -> Option<String> {
        self.transport.requests_to(HttpMethod::Get, ORDERS)[index]
            .header(AUTHORIZATION)
            .map(str::to_owned)
    }

    fn refresh_calls(&self) -> usize {
        self.transport
            .requests_to(HttpMethod::Post, REFRESH_PATH)
            .len()
    }
}

fn orders() -> RequestDescriptor {
    RequestDescriptor::get(ORDERS)
}

fn unauthorized() -> Value {
    json!({ "detail": "Given token not valid for any token type" })
}

#[tokio::test]
async fn stored_token_is_sent_as_bearer() {
    let harness = Harness::signed_in("tok-a", Some("ref-a"));
    harness
        .transport
        .push_json(HttpMethod::Get, ORDERS, 200, json!([]));

    harness.client.send(orders()).await.expect("request succeeds");

    assert_eq!(harness.bearer_of(0).as_deref(), Some("Bearer tok-a"));
}

#[tokio::test]
async fn no_authorization_header_without_a_session() {
    let harness = Harness::new(
        ScriptedTransport::new(),
        Arc::new(InMemorySessionStorage::default()),
        RecordingLoginBoundary::elsewhere(),
    );
    harness
        .transport
        .push_json(HttpMethod::Get, ORDERS, 200, json!([]));

    harness.client.send(orders()).await.expect("request succeeds");

    assert!(harness.bearer_of(0).is_none());
}

#[tokio::test]
async fn unauthorized_response_refreshes_once_and_retries_with_new_token() {
    let harness = Harness::signed_in("tok-a", Some("ref-a"));
    harness
        .transport
        .push_json(HttpMethod::Get, ORDERS, 401, unauthorized());
    harness
        .transport
        .push_json(HttpMethod::Post, REFRESH_PATH, 200, json!({ "access": "tok-b" }));
    harness
        .transport
        .push_json(HttpMethod::Get, ORDERS, 200, json!([{ "id": 1 }]));

    let body: Value = harness
        .client
        .send_json(orders())
        .await
        .expect("retry succeeds");

    assert_eq!(body, json!([{ "id": 1 }]));
    assert_eq!(harness.bearer_of(1).as_deref(), Some("Bearer tok-b"));
    let refresh = &harness.transport.requests_to(HttpMethod::Post, REFRESH_PATH)[0];
    assert_eq!(refresh.body, RequestBody::Json(json!({ "refresh": "ref-a" })));
    assert!(refresh.header(AUTHORIZATION).is_none());
    assert_eq!(harness.slot(ACCESS_TOKEN_KEY).as_deref(), Some("tok-b"));
    assert_eq!(harness.slot(REFRESH_TOKEN_KEY).as_deref(), Some("ref-a"));
}

#[tokio::test]
async fn rotated_refresh_token_is_persisted() {
    let harness = Harness::signed_in("tok-a", Some("ref-a"));
    harness
        .transport
        .push_json(HttpMethod::Get, ORDERS, 401, unauthorized());
    harness.transport.push_json(
        HttpMethod::Post,
        REFRESH_PATH,
        200,
        json!({ "access": "tok-b", "refresh": "ref-b" }),
    );
    harness
        .transport
        .push_json(HttpMethod::Get, ORDERS, 200, json!([]));

    harness.client.send(orders()).await.expect("retry succeeds");

    assert_eq!(harness.slot(REFRESH_TOKEN_KEY).as_deref(), Some("ref-b"));
}

#[tokio::test]
async fn second_unauthorized_is_rejected_without_another_refresh() {
    let harness = Harness::signed_in("tok-a", Some("ref-a"));
    harness
        .transport
        .push_json(HttpMethod::Get, ORDERS, 401, unauthorized());
    harness
        .transport
        .push_json(HttpMethod::Post, REFRESH_PATH, 200, json!({ "access": "tok-b" }));
    harness
        .transport
        .push_json(HttpMethod::Get, ORDERS, 401, unauthorized());

    let error = harness
        .client
        .send(orders())
        .await
        .expect_err("retried request must fail");

    assert_eq!(error.code(), ErrorCode::Unauthorized);
    assert_eq!(error.status(), Some(401));
    assert_eq!(harness.refresh_calls(), 1);
    assert_eq!(harness.transport.requests_to(HttpMethod::Get, ORDERS).len(), 2);
    assert_eq!(harness.slot(ACCESS_TOKEN_KEY).as_deref(), Some("tok-b"));
    assert_eq!(harness.boundary.redirects(), 0);
}

#[tokio::test]
async fn missing_refresh_token_ends_the_session() {
    let storage = Arc::new(InMemorySessionStorage::with_entries([
        (ACCESS_TOKEN_KEY, "tok-a"),
        (USER_KEY, r#"{"id":1,"email":"ama@farm.example"}"#),
        (LEGACY_USER_KEY, r#"{"id":1}"#),
    ]));
    let harness = Harness::new(
        ScriptedTransport::new(),
        storage,
        RecordingLoginBoundary::elsewhere(),
    );
    harness
        .transport
        .push_json(HttpMethod::Get, ORDERS, 401, unauthorized());

    let error = harness
        .client
        .send(orders())
        .await
        .expect_err("session must expire");

    assert_eq!(error.code(), ErrorCode::SessionExpired);
    assert_eq!(error.status(), Some(401));
    assert_eq!(error.message(), SESSION_EXPIRED_MESSAGE);
    assert_eq!(harness.refresh_calls(), 0);
    assert_eq!(harness.transport.requests_to(HttpMethod::Get, ORDERS).len(), 1);
    for key in [ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, USER_KEY, LEGACY_USER_KEY] {
        assert!(harness.slot(key).is_none(), "{key} should be cleared");
    }
    assert_eq!(harness.boundary.redirects(), 1);
}

#[rstest]
#[case::rejected(401, json!({ "detail": "Token is blacklisted" }))]
#[case::server_error(500, json!("Internal Server Error"))]
#[case::missing_access(200, json!({ "refresh": "ref-b" }))]
#[tokio::test]
async fn failed_refresh_ends_the_session(#[case] status: u16, #[case] body: Value) {
    let harness = Harness::signed_in("tok-a", Some("ref-a"));
    harness
        .transport
        .push_json(HttpMethod::Get, ORDERS, 401, unauthorized());
    harness
        .transport
        .push_json(HttpMethod::Post, REFRESH_PATH, status, body);

    let error = harness
        .client
        .send(orders())
        .await
        .expect_err("session must expire");

    assert_eq!(error.code(), ErrorCode::SessionExpired);
    assert_eq!(harness.transport.requests_to(HttpMethod::Get, ORDERS).len(), 1);
    assert!(harness.slot(ACCESS_TOKEN_KEY).is_none());
    assert!(harness.slot(REFRESH_TOKEN_KEY).is_none());
    assert_eq!(harness.boundary.redirects(), 1);
}

#[tokio::test]
async fn no_redirect_when_already_at_login() {
    let harness = Harness::new(
        ScriptedTransport::new(),
        storage_with_tokens("tok-a", None),
        RecordingLoginBoundary::at_login(),
    );
    harness
        .transport
        .push_json(HttpMethod::Get, ORDERS, 401, unauthorized());

    let error = harness
        .client
        .send(orders())
        .await
        .expect_err("session must expire");

    assert_eq!(error.code(), ErrorCode::SessionExpired);
    assert_eq!(harness.boundary.redirects(), 0);
}

#[tokio::test]
async fn forbidden_is_rejected_without_refresh() {
    let harness = Harness::signed_in("tok-a", Some("ref-a"));
    harness.transport.push_json(
        HttpMethod::Get,
        ORDERS,
        403,
        json!({ "detail": "You do not have permission to perform this action." }),
    );

    let error = harness
        .client
        .send(orders())
        .await
        .expect_err("forbidden must fail");

    assert_eq!(error.code(), ErrorCode::Forbidden);
    assert_eq!(
        error.message(),
        "You do not have permission to perform this action."
    );
    assert_eq!(harness.refresh_calls(), 0);
    assert_eq!(harness.slot(ACCESS_TOKEN_KEY).as_deref(), Some("tok-a"));
}

#[tokio::test]
async fn anonymous_unauthorized_is_not_refreshed() {
    let harness = Harness::signed_in("tok-a", Some("ref-a"));
    harness.transport.push_json(
        HttpMethod::Post,
        "auth/login/",
        401,
        json!({ "detail": "No active account found with the given credentials" }),
    );

    let error = harness
        .client
        .send(RequestDescriptor::post("auth/login/").anonymous())
        .await
        .expect_err("login must fail");

    assert_eq!(error.code(), ErrorCode::Unauthorized);
    assert_eq!(harness.refresh_calls(), 0);
    assert_eq!(harness.boundary.redirects(), 0);
}

#[rstest]
#[case::not_found(404, json!({ "detail": "Not found." }), ErrorCode::NotFound, "Not found.")]
#[case::validation(400, json!({ "quantity": ["Ensure this value is greater than 0."] }), ErrorCode::InvalidRequest, "Ensure this value is greater than 0.")]
#[case::server(502, json!("Bad Gateway"), ErrorCode::Server, "Bad Gateway")]
#[tokio::test]
async fn other_statuses_are_normalized(
    #[case] status: u16,
    #[case] body: Value,
    #[case] code: ErrorCode,
    #[case] message: &str,
) {
    let harness = Harness::signed_in("tok-a", Some("ref-a"));
    harness
        .transport
        .push_json(HttpMethod::Get, ORDERS, status, body.clone());

    let error = harness.client.send(orders()).await.expect_err("must fail");

    assert_eq!(error.code(), code);
    assert_eq!(error.message(), message);
    assert_eq!(error.status(), Some(status));
    assert_eq!(error.raw_data(), Some(&body));
}

#[tokio::test]
async fn concurrent_unauthorized_requests_share_one_refresh() {
    let harness = Harness::new(
        ScriptedTransport::new().with_latency(Duration::from_millis(20)),
        storage_with_tokens("tok-a", Some("ref-a")),
        RecordingLoginBoundary::elsewhere(),
    );
    harness.transport.route(HttpMethod::Get, ORDERS, |request| {
        if request.header(AUTHORIZATION) == Some("Bearer tok-fresh") {
            HttpResponse::json(200, &json!([]))
        } else {
            HttpResponse::json(401, &unauthorized())
        }
    });
    harness.transport.route(HttpMethod::Post, REFRESH_PATH, |_| {
        HttpResponse::json(200, &json!({ "access": "tok-fresh" }))
    });

    let outcomes =
        futures::future::join_all((0..3).map(|_| harness.client.send(orders()))).await;

    for outcome in outcomes {
        outcome.expect("every request recovers");
    }
    assert_eq!(harness.refresh_calls(), 1);
    assert_eq!(harness.transport.requests_to(HttpMethod::Get, ORDERS).len(), 6);
    assert_eq!(harness.slot(ACCESS_TOKEN_KEY).as_deref(), Some("tok-fresh"));
}

#[tokio::test]
async fn cancelled_request_is_not_retried() {
    let harness = Harness::signed_in("tok-a", Some("ref-a"));
    harness
        .transport
        .push(HttpMethod::Get, ORDERS, ScriptedReply::Hang);
    let token = CancellationToken::new();
    let client = harness.client.with_cancellation(token.clone());

    let (outcome, ()) = tokio::join!(client.send(orders()), async {
        tokio::time::sleep(Duration::from_millis(10)).await;
        token.cancel();
    });

    let error = outcome.expect_err("request must be cancelled");
    assert_eq!(error.code(), ErrorCode::Cancelled);
    assert_eq!(harness.transport.requests().len(), 1);
    assert_eq!(harness.slot(ACCESS_TOKEN_KEY).as_deref(), Some("tok-a"));
}

#[tokio::test]
async fn cancelling_during_refresh_keeps_the_session() {
    let harness = Harness::signed_in("tok-a", Some("ref-a"));
    harness
        .transport
        .push_json(HttpMethod::Get, ORDERS, 401, unauthorized());
    harness
        .transport
        .push(HttpMethod::Post, REFRESH_PATH, ScriptedReply::Hang);
    let token = CancellationToken::new();
    let request = orders().with_cancellation(token.clone());

    let (outcome, ()) = tokio::join!(harness.client.send(request), async {
        tokio::time::sleep(Duration::from_millis(10)).await;
        token.cancel();
    });

    let error = outcome.expect_err("request must be cancelled");
    assert_eq!(error.code(), ErrorCode::Cancelled);
    assert_eq!(harness.slot(ACCESS_TOKEN_KEY).as_deref(), Some("tok-a"));
    assert_eq!(harness.slot(REFRESH_TOKEN_KEY).as_deref(), Some("ref-a"));
    assert_eq!(harness.boundary.redirects(), 0);
}

#[tokio::test]
async fn already_cancelled_token_sends_nothing() {
    let harness = Harness::signed_in("tok-a", Some("ref-a"));
    let token = CancellationToken::new();
    token.cancel();

    let error = harness
        .client
        .with_cancellation(token)
        .send(orders())
        .await
        .expect_err("request must be cancelled");

    assert_eq!(error.code(), ErrorCode::Cancelled);
    assert!(harness.transport.requests().is_empty());
}

#[tokio::test]
async fn transport_failure_reports_connectivity() {
    let harness = Harness::signed_in("tok-a", Some("ref-a"));
    harness.transport.push(
        HttpMethod::Get,
        ORDERS,
        ScriptedReply::Fail(TransportError::unreachable("connection refused")),
    );

    let error = harness.client.send(orders()).await.expect_err("must fail");

    assert_eq!(error.code(), ErrorCode::Transport);
    assert_eq!(error.message(), CONNECTIVITY_MESSAGE);
    assert!(error.status().is_none());
    assert_eq!(harness.refresh_calls(), 0);
}

#[tokio::test]
async fn empty_success_body_decodes_as_unit() {
    let harness = Harness::signed_in("tok-a", Some("ref-a"));
    harness.transport.push(
        HttpMethod::Delete,
        "cart/clear/",
        ScriptedReply::Respond(HttpResponse::empty(204)),
    );

    harness
        .client
        .send_json::<()>(RequestDescriptor::delete("cart/clear/"))
        .await
        .expect("204 decodes");
}

#[tokio::test]
async fn undecodable_success_body_is_an_invalid_response() {
    let harness = Harness::signed_in("tok-a", Some("ref-a"));
    harness
        .transport
        .push_json(HttpMethod::Get, ORDERS, 200, json!({ "unexpected": true }));

    let error = harness
        .client
        .send_json::<Vec<Value>>(orders())
        .await
        .expect_err("shape mismatch must fail");

    assert_eq!(error.code(), ErrorCode::InvalidResponse);
    assert_eq!(error.status(), Some(200));
    assert!(error.message().starts_with("Unexpected response from orders/"));
}

#[tokio::test]
async fn explicit_refresh_without_refresh_token_leaves_session_alone() {
    let harness = Harness::signed_in("tok-a", None);

    let error = harness
        .client
        .refresh()
        .await
        .expect_err("refresh needs a refresh token");

    assert_eq!(error.code(), ErrorCode::Configuration);
    assert!(error.message().contains(NO_REFRESH_TOKEN));
    assert_eq!(harness.slot(ACCESS_TOKEN_KEY).as_deref(), Some("tok-a"));
    assert_eq!(harness.boundary.redirects(), 0);
}

#[tokio::test]
async fn explicit_refresh_returns_the_new_access_token() {
    let harness = Harness::signed_in("tok-a", Some("ref-a"));
    harness
        .transport
        .push_json(HttpMethod::Post, REFRESH_PATH, 200, json!({ "access": "tok-b" }));

    let token = harness.client.refresh().await.expect("refresh succeeds");

    assert_eq!(token, "tok-b");
    assert_eq!(harness.slot(ACCESS_TOKEN_KEY).as_deref(), Some("tok-b"));
}
