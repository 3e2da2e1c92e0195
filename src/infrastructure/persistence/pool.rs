//! PostgreSQL pool lifecycle: connect with retry, embedded migrations.

use anyhow::{Context, Result};
use sqlx::PgPool;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;
use std::time::Duration;
use tokio_retry::Retry;
use tokio_retry::strategy::{ExponentialBackoff, jitter};

use crate::config::{Config, mask_connection_string};

/// Schema migrations embedded from `./migrations`.
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Opens the connection pool, retrying with exponential backoff.
///
/// The first attempt is immediate; up to `db_connect_retries - 1` further
/// attempts follow with delays of 500ms, 1s, 2s ... capped at 10s.
///
/// # Errors
///
/// Returns the last connection error once all attempts are used.
pub async fn connect(config: &Config) -> Result<PgPool> {
    let options = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
        .idle_timeout(Duration::from_secs(config.db_idle_timeout))
        .max_lifetime(Duration::from_secs(config.db_max_lifetime));

    let strategy = ExponentialBackoff::from_millis(2)
        .factor(250)
        .max_delay(Duration::from_secs(10))
        .map(jitter)
        .take(config.db_connect_retries.saturating_sub(1));

    let masked = mask_connection_string(&config.database_url);

    Retry::spawn(strategy, || {
        let options = options.clone();
        let url = config.database_url.clone();
        let masked = masked.clone();
        async move {
            options.connect(&url).await.inspect_err(|e| {
                tracing::warn!(database = %masked, error = %e, "Database connection attempt failed");
            })
        }
    })
    .await
    .with_context(|| format!("Failed to connect to database {masked}"))
}

/// Applies pending migrations.
///
/// # Errors
///
/// Returns an error if a migration fails or the history is inconsistent.
pub async fn migrate(pool: &PgPool) -> Result<()> {
    MIGRATOR
        .run(pool)
        .await
        .context("Failed to run database migrations")
}
