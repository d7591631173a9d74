//! PostgreSQL connection pool for the catalog.
//!
//! The pool is created once at startup and handed to the modules that need it;
//! there is no global handle.

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use bookstore_kernel::settings::DatabaseSettings;

/// Open a pool against `settings.url` with at most `settings.max_connections`.
///
/// # Errors
///
/// Returns an error if the first connection cannot be established.
pub async fn connect(settings: &DatabaseSettings) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .connect(&settings.url)
        .await
        .with_context(|| "failed to connect to database")?;

    tracing::info!(
        target: "bookstore-db",
        max_connections = settings.max_connections,
        "database pool established"
    );
    Ok(pool)
}

/// Close every connection in the pool and wait for them to be released.
pub async fn close(pool: &PgPool) {
    pool.close().await;
    tracing::info!(target: "bookstore-db", "database pool closed");
}
