mod common;

use async_trait::async_trait;
use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::{Value, json};
use std::sync::Arc;
use tinylink::domain::entities::{Link, NewLink};
use tinylink::domain::repositories::LinkRepository;
use tinylink::error::AppError;
use tinylink::state::AppState;

#[tokio::test]
async fn test_health_endpoint_success() {
    let (server, _repo) = common::make_server();

    let response = server.get("/healthz").await;

    response.assert_status_ok();
    let body = response.json::<Value>();
    assert_eq!(body["ok"], true);
    assert_eq!(body["db"]["ok"], true);
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    assert!(body["db"].get("error").is_none());
}

/// Store that is never reachable.
struct UnreachableStore;

#[async_trait]
impl LinkRepository for UnreachableStore {
    async fn create(&self, _new_link: NewLink) -> Result<Link, AppError> {
        Err(unreachable_error())
    }

    async fn exists(&self, _code: &str) -> Result<bool, AppError> {
        Err(unreachable_error())
    }

    async fn find_by_code(&self, _code: &str) -> Result<Option<Link>, AppError> {
        Err(unreachable_error())
    }

    async fn list(&self) -> Result<Vec<Link>, AppError> {
        Err(unreachable_error())
    }

    async fn record_click(&self, _code: &str) -> Result<Option<String>, AppError> {
        Err(unreachable_error())
    }

    async fn delete(&self, _code: &str) -> Result<bool, AppError> {
        Err(unreachable_error())
    }

    async fn ping(&self) -> Result<(), AppError> {
        Err(unreachable_error())
    }
}

fn unreachable_error() -> AppError {
    AppError::internal("Database error", json!({}))
}

fn make_unreachable_server() -> TestServer {
    let state = AppState::with_repository(Arc::new(UnreachableStore), Some(common::BASE_URL.into()));
    TestServer::new(common::create_test_router(state)).unwrap()
}

#[tokio::test]
async fn test_health_endpoint_store_down() {
    let server = make_unreachable_server();

    let response = server.get("/healthz").await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let body = response.json::<Value>();
    assert_eq!(body["ok"], false);
    assert_eq!(body["db"]["ok"], false);
    assert_eq!(body["db"]["error"], "Database error");
}

#[tokio::test]
async fn test_store_failure_maps_to_500() {
    let server = make_unreachable_server();

    let response = server.get("/api/links").await;
    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.json::<Value>()["error"]["code"], "internal_error");

    server
        .get("/abc123")
        .await
        .assert_status(StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_create_survives_failing_existence_checks() {
    // Every existence check fails, the resolver falls back to its last
    // candidate, and the insert itself then fails with a store error.
    let server = make_unreachable_server();

    let response = server
        .post("/api/links")
        .json(&json!({ "url": "https://example.com" }))
        .await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
}
