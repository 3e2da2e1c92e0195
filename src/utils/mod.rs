//! Utility functions for code generation, URL processing, and request handling.
//!
//! This module provides helper functions used across the application:
//!
//! - [`code_generator`] - Short code generation and validation
//! - [`url_validator`] - Destination URL validation
//! - [`base_url`] - Short URL prefix resolution from config or request headers
//! - [`db_error`] - Database error classification

pub mod base_url;
pub mod code_generator;
pub mod db_error;
pub mod url_validator;
