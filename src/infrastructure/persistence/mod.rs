//! Link repository implementations and database lifecycle.
//!
//! - [`PgLinkRepository`] - PostgreSQL storage via SQLx
//! - [`InMemoryLinkRepository`] - Process-local storage with the same semantics,
//!   used by tests and embedders that don't need durability
//! - [`pool`] - Connection pool setup and embedded migrations

pub mod memory_link_repository;
pub mod pg_link_repository;
pub mod pool;

pub use memory_link_repository::InMemoryLinkRepository;
pub use pg_link_repository::PgLinkRepository;
