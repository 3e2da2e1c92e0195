//! Base URL resolution for short link composition.

use crate::AppError;
use axum::http::{HeaderMap, Uri, header};
use serde_json::json;

const FORWARDED_PROTO: &str = "x-forwarded-proto";
const FORWARDED_HOST: &str = "x-forwarded-host";

/// Resolves the prefix that short URLs are composed with.
///
/// A configured override always wins. Otherwise the prefix is derived from the
/// inbound request:
///
/// - scheme from `X-Forwarded-Proto`, then the request URI, default `http`
/// - host from `X-Forwarded-Host`, then `Host`, then the URI authority
///
/// HTTP/2 clients send the authority in the URI instead of a `Host` header.
/// The host keeps its port.
///
/// # Errors
///
/// Returns [`AppError::Validation`] if no override is configured and the
/// request names no host at all.
///
/// # Examples
///
/// ```ignore
/// let mut headers = HeaderMap::new();
/// headers.insert(header::HOST, "localhost:4000".parse().unwrap());
/// let uri = Uri::from_static("/api/links");
///
/// assert_eq!(resolve_base_url(None, &headers, &uri).unwrap(), "http://localhost:4000");
/// assert_eq!(resolve_base_url(Some("https://s.io/"), &headers, &uri).unwrap(), "https://s.io");
/// ```
pub fn resolve_base_url(
    configured: Option<&str>,
    headers: &HeaderMap,
    uri: &Uri,
) -> Result<String, AppError> {
    if let Some(base) = configured {
        return Ok(base.trim_end_matches('/').to_string());
    }

    let scheme = first_value(headers, FORWARDED_PROTO)
        .or_else(|| uri.scheme_str())
        .filter(|proto| matches!(*proto, "http" | "https"))
        .unwrap_or("http");

    let host = first_value(headers, FORWARDED_HOST)
        .or_else(|| first_value(headers, header::HOST.as_str()))
        .or_else(|| uri.authority().map(|a| a.as_str()))
        .ok_or_else(|| AppError::bad_request("Missing Host header", json!({})))?;

    Ok(format!("{scheme}://{host}"))
}

/// Composes a short URL from a base prefix and a code.
pub fn short_url(base: &str, code: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), code)
}

/// First comma-separated, trimmed value of a header, if it is valid UTF-8.
fn first_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)?
        .to_str()
        .ok()?
        .split(',')
        .next()
        .map(str::trim)
        .filter(|v| !v.is_empty())
}
