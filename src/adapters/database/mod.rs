pub mod message_repo;
pub mod records;

use crate::config::DatabaseConfig;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Pool, Sqlite};
use std::time::Duration;

pub type DbPool = Pool<Sqlite>;

/// Initializes the database connection pool.
///
/// An in-memory database lives only as long as its connection, so such URLs get
/// exactly one connection that is never recycled.
///
/// # Errors
/// Returns `sqlx::Error` if the connection fails.
pub async fn init_pool(config: &DatabaseConfig) -> Result<DbPool, sqlx::Error> {
    let options = SqlitePoolOptions::new().acquire_timeout(Duration::from_secs(config.acquire_timeout_secs));

    let options = if config.url.contains(":memory:") {
        options.max_connections(1).min_connections(1).idle_timeout(None).max_lifetime(None)
    } else {
        options.max_connections(config.max_connections).min_connections(config.min_connections)
    };

    options.connect(&config.url).await
}
