/// Database connection pool management
///
/// Wraps `PgPoolOptions` with the pool settings Taskwell runs with and a
/// startup health check.
///
/// # Example
///
/// ```no_run
/// use taskwell_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), sqlx::Error> {
/// let pool = create_pool(DatabaseConfig::from_url("postgresql://localhost/taskwell")).await?;
/// # Ok(())
/// # }
/// ```

use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Configuration for the database connection pool
///
/// Timeouts are in seconds so they can be read straight from environment
/// variables.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Minimum number of idle connections kept warm
    pub min_connections: u32,

    /// How long to wait for a free connection before failing the request
    pub acquire_timeout_seconds: u64,

    /// Idle connections older than this are closed (None = never)
    pub idle_timeout_seconds: Option<u64>,

    /// Connections are recycled after this long (None = never)
    pub max_lifetime_seconds: Option<u64>,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: 10,
            min_connections: 1,
            acquire_timeout_seconds: 30,
            idle_timeout_seconds: Some(600),
            max_lifetime_seconds: Some(1800),
        }
    }
}

impl DatabaseConfig {
    /// Default pool settings for the given connection URL
    pub fn from_url(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    fn pool_options(&self) -> PgPoolOptions {
        let mut options = PgPoolOptions::new()
            .max_connections(self.max_connections)
            .min_connections(self.min_connections)
            .acquire_timeout(Duration::from_secs(self.acquire_timeout_seconds));

        if let Some(idle) = self.idle_timeout_seconds {
            options = options.idle_timeout(Duration::from_secs(idle));
        }
        if let Some(lifetime) = self.max_lifetime_seconds {
            options = options.max_lifetime(Duration::from_secs(lifetime));
        }

        options
    }
}

/// Creates a pool and verifies the database answers
///
/// # Errors
///
/// Returns an error if the URL is invalid, the server is unreachable or the
/// health check query fails.
pub async fn create_pool(config: DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    info!(
        max_connections = config.max_connections,
        min_connections = config.min_connections,
        acquire_timeout_seconds = config.acquire_timeout_seconds,
        "Creating database connection pool"
    );

    let pool = config.pool_options().connect(&config.url).await?;
    health_check(&pool).await?;

    info!("Database connection pool created successfully");
    Ok(pool)
}

/// Creates a pool without opening any connection
///
/// Connections are established on first use. The URL is still parsed, so a
/// malformed URL fails here. Must be called inside a tokio runtime.
pub fn create_lazy_pool(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    config
        .pool_options()
        .min_connections(0)
        .connect_lazy(&config.url)
}

/// Executes `SELECT 1` to verify the database is reachable
pub async fn health_check(pool: &PgPool) -> Result<(), sqlx::Error> {
    debug!("Performing database health check");

    let (value,): (i32,) = sqlx::query_as("SELECT 1").fetch_one(pool).await?;

    if value == 1 {
        Ok(())
    } else {
        warn!("Database health check returned unexpected value: {}", value);
        Err(sqlx::Error::Protocol(
            "Health check returned unexpected value".into(),
        ))
    }
}

/// Gracefully closes the connection pool on shutdown
pub async fn close_pool(pool: PgPool) {
    info!("Closing database connection pool");
    pool.close().await;
}
