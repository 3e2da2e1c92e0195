#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Request, Response};
use axum::{Router, routing::get};
use axum_test::TestServer;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tinylink::api;
use tinylink::api::handlers::{health_handler, redirect_handler};
use tinylink::api::middleware::cors;
use tinylink::domain::entities::Link;
use tinylink::infrastructure::persistence::InMemoryLinkRepository;
use tinylink::routes::app_router;
use tinylink::state::AppState;
use tower::ServiceExt;
use tower_http::normalize_path::NormalizePath;

pub const BASE_URL: &str = "http://sho.rt";

/// Builds state over a fresh in-process repository.
///
/// The repository handle is returned so tests can seed rows and inspect
/// counters directly.
pub fn create_test_state(base_url: Option<&str>) -> (AppState, Arc<InMemoryLinkRepository>) {
    let repo = Arc::new(InMemoryLinkRepository::new());
    let state = AppState::with_repository(repo.clone(), base_url.map(str::to_string));
    (state, repo)
}

/// Mirrors the production route table without the outer middleware.
pub fn create_test_router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(health_handler))
        .route("/{code}", get(redirect_handler))
        .nest("/api", api::routes::link_routes())
        .with_state(state)
}

/// The production application: full route table, CORS, tracing and
/// trailing-slash normalization.
pub fn create_test_app(state: AppState, cors_origin: Option<&str>) -> NormalizePath<Router> {
    app_router(state, cors::layer(cors_origin).unwrap())
}

/// Sends one request through the full application.
pub async fn send(app: &NormalizePath<Router>, request: Request<Body>) -> Response<Body> {
    app.clone().oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Test server with a fixed `BASE_URL`.
pub fn make_server() -> (TestServer, Arc<InMemoryLinkRepository>) {
    let (state, repo) = create_test_state(Some(BASE_URL));
    (TestServer::new(create_test_router(state)).unwrap(), repo)
}

pub async fn seed_link(repo: &InMemoryLinkRepository, code: &str, url: &str) {
    seed_link_at(repo, code, url, Utc::now()).await;
}

pub async fn seed_link_at(
    repo: &InMemoryLinkRepository,
    code: &str,
    url: &str,
    created_at: DateTime<Utc>,
) {
    repo.seed(Link::new(code.to_string(), url.to_string(), 0, None, created_at))
        .await;
}
