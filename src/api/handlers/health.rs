//! Handler for health check endpoint.

use axum::{Json, extract::State, http::StatusCode};

use crate::api::dto::health::{DbStatus, HealthResponse};
use crate::state::AppState;

/// Reports whether the service can reach its store.
///
/// # Endpoint
///
/// `GET /healthz`
///
/// # Response Codes
///
/// - **200 OK**: store answered `SELECT 1`
/// - **500 Internal Server Error**: store unreachable
///
/// # Response
///
/// ```json
/// { "ok": true, "version": "0.1.0", "db": { "ok": true } }
/// ```
pub async fn health_handler(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let db = match state.link_service.check_store().await {
        Ok(()) => DbStatus {
            ok: true,
            error: None,
        },
        Err(e) => {
            tracing::error!(error = %e, "Health check failed");
            DbStatus {
                ok: false,
                error: Some(e.to_string()),
            }
        }
    };

    let status = if db.ok {
        StatusCode::OK
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };

    (
        status,
        Json(HealthResponse {
            ok: db.ok,
            version: env!("CARGO_PKG_VERSION").to_string(),
            db,
        }),
    )
}
