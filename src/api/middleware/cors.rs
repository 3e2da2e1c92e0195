//! Cross-origin resource sharing middleware.

use anyhow::{Context, Result};
use axum::http::{HeaderValue, Method};
use tower_http::cors::{AllowHeaders, AllowOrigin, CorsLayer};

/// Creates the CORS middleware.
///
/// # Origins
///
/// - `None` - any origin is allowed (the request `Origin` is echoed back)
/// - `Some("https://a.example, https://b.example")` - only the listed origins
///
/// Requested headers are mirrored instead of being hardcoded, so browsers
/// sending extra client-hint headers pass preflight.
///
/// # Errors
///
/// Returns an error if a configured origin is not a valid header value.
pub fn layer(origins: Option<&str>) -> Result<CorsLayer> {
    let allow_origin = match origins {
        Some(list) => {
            let values = list
                .split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .map(|o| HeaderValue::from_str(o).with_context(|| format!("Invalid CORS origin '{o}'")))
                .collect::<Result<Vec<_>>>()?;
            AllowOrigin::list(values)
        }
        None => AllowOrigin::mirror_request(),
    };

    Ok(CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(AllowHeaders::mirror_request()))
}
