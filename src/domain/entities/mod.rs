//! Core domain entities.
//!
//! - [`Link`] - A short code mapped to a destination URL, with click counters
//! - [`NewLink`] - Input for inserting a link

pub mod link;

pub use link::{Link, NewLink};
