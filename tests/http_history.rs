// tests/http_history.rs
use axum::body::{self, Body};
use axum::http::{Request, StatusCode};
use change_audit::domain::audit::TrackedMutation;
use change_audit::presentation::http::{routes::build_router, state::HttpState};
use serde_json::{Value, json};
use tower::util::ServiceExt as _;

mod support;
use support::{Invoice, harness};

async fn get(app: axum::Router, uri: &str) -> (StatusCode, Value) {
    let req = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = body::to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

#[tokio::test]
async fn health_returns_ok() {
    let h = harness();
    let app = build_router(HttpState::new(h.services));
    let (status, body) = get(app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok"}));
}

/// 履歴エンドポイントは新しい順に返す
#[tokio::test]
async fn history_endpoint_returns_records_newest_first() {
    let h = harness();
    let before = Invoice::new(42, 100);
    let after = Invoice::new(42, 150);
    h.services
        .interceptor()
        .saving_changes_strict(&[TrackedMutation::created(&before)])
        .await
        .unwrap();
    h.services
        .interceptor()
        .saving_changes_strict(&[TrackedMutation::updated(&before, &after)])
        .await
        .unwrap();

    let app = build_router(HttpState::new(h.services.clone()));
    let (status, body) = get(app, "/api/v1/audit/Invoice/42").await;
    assert_eq!(status, StatusCode::OK);

    let records = body.as_array().unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["operation"], "Updated");
    assert_eq!(records[0]["entityType"], "dbo.Invoice");
    assert_eq!(records[0]["entityId"], "42");
    assert_eq!(records[0]["userId"], "system");
    assert_eq!(
        records[0]["changes"],
        json!({"Amount": {"old": 100, "new": 150}})
    );
    assert_eq!(records[1]["operation"], "Created");
}

#[tokio::test]
async fn unknown_entity_returns_404_and_empty_history_is_ok() {
    let h = harness();
    let app = build_router(HttpState::new(h.services));

    let (status, body) = get(app.clone(), "/api/v1/audit/Ghost/1").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Not Found");

    let (status, body) = get(app, "/api/v1/audit/Invoice/999").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn offline_backend_returns_503() {
    let h = harness();
    h.services.register::<Invoice>().unwrap();
    h.store.backend("dbo").unwrap().set_offline(true);

    let app = build_router(HttpState::new(h.services));
    let (status, _) = get(app, "/api/v1/audit/Invoice/1").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}
