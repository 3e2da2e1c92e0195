//! Handler for short URL redirect.

use axum::{
    extract::{Path, State},
    http::{StatusCode, header},
    response::IntoResponse,
};
use url::Url;

use crate::error::AppError;
use crate::state::AppState;

/// Redirects a short code to its destination and counts the click.
///
/// # Endpoint
///
/// `GET /{code}`
///
/// # Request Flow
///
/// 1. Reject reserved names (`api`, `healthz`)
/// 2. Atomically increment `clicks`, stamp `last_clicked`, fetch the URL
/// 3. Return 302 Found with `Location`
///
/// The `Location` value is the serialized form of the stored URL, which is
/// always ASCII (IDNA hosts, percent-encoded paths).
///
/// # Errors
///
/// Returns 404 Not Found for unknown or reserved codes.
pub async fn redirect_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let url = state.link_service.resolve_and_count(&code).await?;

    let location = Url::parse(&url).map(String::from).unwrap_or(url);

    Ok((StatusCode::FOUND, [(header::LOCATION, location)]))
}
