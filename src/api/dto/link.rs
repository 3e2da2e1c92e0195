//! DTOs for link management endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use validator::Validate;

use crate::domain::entities::Link;
use crate::error::AppError;

/// Request body for `POST /api/links`.
///
/// Fields are kept as raw JSON so that a missing, `null` or wrongly typed
/// value is answered with the same 400 as a malformed one instead of an
/// extractor rejection. See [`CreateLinkRequest::into_input`].
#[derive(Debug, Deserialize)]
pub struct CreateLinkRequest {
    #[serde(default)]
    pub url: Option<Value>,

    /// Optional custom short code.
    #[serde(default)]
    pub code: Option<Value>,
}

/// Typed create input, after field types are checked.
#[derive(Debug, Validate)]
pub struct CreateLinkInput {
    #[validate(length(max = 2048, message = "URL is too long"))]
    pub url: String,

    #[validate(length(max = 64, message = "Code is too long"))]
    pub code: Option<String>,
}

impl CreateLinkRequest {
    /// Checks field types and applies length limits.
    ///
    /// - `url`: absent or `null` becomes an empty string (rejected later as an
    ///   invalid URL); any other non-string is `invalid url`
    /// - `code`: absent or `null` means "generate one"; a number is taken as
    ///   its decimal text; any other non-string is `invalid code format`
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] for wrongly typed or oversized fields.
    pub fn into_input(self) -> Result<CreateLinkInput, AppError> {
        let url = match self.url {
            None => String::new(),
            Some(Value::String(url)) => url,
            Some(other) => {
                return Err(AppError::bad_request(
                    "invalid url",
                    json!({ "url": other, "reason": "expected a string" }),
                ));
            }
        };

        let code = match self.code {
            None => None,
            Some(Value::String(code)) => Some(code),
            Some(Value::Number(n)) => Some(n.to_string()),
            Some(other) => {
                return Err(AppError::bad_request(
                    "invalid code format",
                    json!({ "code": other, "reason": "expected a string" }),
                ));
            }
        };

        let input = CreateLinkInput { url, code };
        input.validate()?;

        Ok(input)
    }
}

/// Response for a created link.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLinkResponse {
    pub code: String,
    pub url: String,
    pub short_url: String,
}

/// Full link record with click statistics.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkResponse {
    pub code: String,
    pub url: String,
    pub short_url: String,
    pub clicks: i64,
    pub last_clicked: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl LinkResponse {
    /// Builds the response from a link and its composed short URL.
    pub fn from_link(link: Link, short_url: String) -> Self {
        Self {
            code: link.code,
            url: link.url,
            short_url,
            clicks: link.clicks,
            last_clicked: link.last_clicked,
            created_at: link.created_at,
        }
    }
}

/// Acknowledgement body for deletions.
#[derive(Debug, Serialize)]
pub struct OkResponse {
    pub ok: bool,
}
