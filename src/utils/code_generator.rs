//! Short code generation and validation utilities.
//!
//! Codes are drawn from a fixed 62-symbol alphabet (`0-9a-zA-Z`) using the
//! operating system's cryptographically secure RNG.

use std::sync::LazyLock;

use crate::error::AppError;
use regex::Regex;
use serde_json::json;

/// Code alphabet: digits, then lowercase, then uppercase.
pub const ALPHABET: &[u8; 62] = b"0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Shortest accepted code length.
pub const MIN_CODE_LENGTH: usize = 6;

/// Longest accepted code length.
pub const MAX_CODE_LENGTH: usize = 8;

/// Length used when none is configured.
pub const DEFAULT_CODE_LENGTH: usize = 6;

/// Paths served by the router itself; never resolved as short links.
pub const RESERVED_CODES: &[&str] = &["api", "healthz"];

static CODE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9]{6,8}$").expect("static regex is valid"));

/// Generates a random short code of exactly `length` symbols.
///
/// Each random byte is mapped onto [`ALPHABET`] with `byte % 62`. The slight
/// modulo bias is accepted since codes are identifiers, not secrets.
///
/// # Errors
///
/// Returns [`AppError::Internal`] if the OS random number generator fails.
///
/// # Examples
///
/// ```ignore
/// let code = generate_code(6)?;
/// assert_eq!(code.len(), 6);
/// assert!(code.chars().all(|c| c.is_ascii_alphanumeric()));
/// ```
pub fn generate_code(length: usize) -> Result<String, AppError> {
    let mut buffer = vec![0u8; length];

    getrandom::fill(&mut buffer).map_err(|e| {
        AppError::internal(
            "Failed to generate random bytes",
            json!({ "reason": e.to_string() }),
        )
    })?;

    Ok(buffer
        .iter()
        .map(|byte| ALPHABET[usize::from(*byte) % ALPHABET.len()] as char)
        .collect())
}

/// Returns true if `code` has the shape of a short code (6-8 alphanumerics).
pub fn is_valid_code(code: &str) -> bool {
    CODE_REGEX.is_match(code)
}

/// Returns true if `code` collides with a router path.
pub fn is_reserved_code(code: &str) -> bool {
    RESERVED_CODES.contains(&code)
}

/// Validates a user-provided custom short code.
///
/// # Errors
///
/// Returns [`AppError::Validation`] unless the code matches `^[A-Za-z0-9]{6,8}$`.
pub fn validate_custom_code(code: &str) -> Result<(), AppError> {
    if !is_valid_code(code) {
        return Err(AppError::bad_request(
            "invalid code format",
            json!({ "code": code, "expected": "^[A-Za-z0-9]{6,8}$" }),
        ));
    }

    Ok(())
}
