//! Handlers for link management endpoints (create, list, show, delete).

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::{HeaderMap, StatusCode, Uri},
};

use crate::api::dto::link::{CreateLinkRequest, CreateLinkResponse, LinkResponse, OkResponse};
use crate::error::AppError;
use crate::state::AppState;
use crate::utils::base_url::{resolve_base_url, short_url};

/// Creates a short link.
///
/// # Endpoint
///
/// `POST /api/links`
///
/// # Request Body
///
/// ```json
/// { "url": "https://example.com/hello", "code": "testA1" }
/// ```
///
/// `code` is optional; a random 6-8 character code is generated when absent.
///
/// # Response
///
/// `201 Created`
///
/// ```json
/// { "code": "testA1", "url": "https://example.com/hello", "shortUrl": "http://localhost:4000/testA1" }
/// ```
///
/// # Errors
///
/// Returns 400 Bad Request for an unreadable body, or an invalid URL or code
/// (wrong JSON type included).
/// Returns 409 Conflict if the code is already taken.
pub async fn create_link_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    uri: Uri,
    payload: Result<Json<CreateLinkRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CreateLinkResponse>), AppError> {
    let Json(payload) = payload?;
    let input = payload.into_input()?;

    let base = resolve_base_url(state.base_url.as_deref(), &headers, &uri)?;

    let link = state
        .link_service
        .create_link(&input.url, input.code.as_deref())
        .await?;

    let short_url = short_url(&base, &link.code);

    Ok((
        StatusCode::CREATED,
        Json(CreateLinkResponse {
            code: link.code,
            url: link.url,
            short_url,
        }),
    ))
}

/// Lists all links, newest first.
///
/// # Endpoint
///
/// `GET /api/links`
pub async fn list_links_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    uri: Uri,
) -> Result<Json<Vec<LinkResponse>>, AppError> {
    let base = resolve_base_url(state.base_url.as_deref(), &headers, &uri)?;

    let links = state.link_service.list_links().await?;

    Ok(Json(
        links
            .into_iter()
            .map(|link| {
                let short_url = short_url(&base, &link.code);
                LinkResponse::from_link(link, short_url)
            })
            .collect(),
    ))
}

/// Returns one link with its click statistics.
///
/// # Endpoint
///
/// `GET /api/links/{code}`
///
/// # Errors
///
/// Returns 404 Not Found if the code doesn't exist.
pub async fn get_link_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
    headers: HeaderMap,
    uri: Uri,
) -> Result<Json<LinkResponse>, AppError> {
    let base = resolve_base_url(state.base_url.as_deref(), &headers, &uri)?;

    let link = state.link_service.get_link(&code).await?;
    let short_url = short_url(&base, &link.code);

    Ok(Json(LinkResponse::from_link(link, short_url)))
}

/// Deletes a link permanently.
///
/// # Endpoint
///
/// `DELETE /api/links/{code}`
///
/// Subsequent redirects for this code return 404.
///
/// # Errors
///
/// Returns 404 Not Found if the code doesn't exist or was already deleted.
pub async fn delete_link_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<OkResponse>, AppError> {
    state.link_service.delete_link(&code).await?;

    Ok(Json(OkResponse { ok: true }))
}
