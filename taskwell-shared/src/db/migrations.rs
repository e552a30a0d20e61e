/// Database migration runner
///
/// Migrations live in the workspace-level `migrations/` directory and are
/// embedded into the binary at compile time. Each migration is a reversible
/// pair:
/// - `{timestamp}_{name}.up.sql`
/// - `{timestamp}_{name}.down.sql`

use sqlx::{migrate::MigrateDatabase, postgres::PgPool, Postgres};
use tracing::{debug, info, warn};

/// Runs all pending database migrations
///
/// Creates the `_sqlx_migrations` bookkeeping table on first run and applies
/// every migration that has not been recorded yet.
///
/// # Errors
///
/// Returns an error if a migration fails to execute or if an applied
/// migration no longer matches its checksum.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    info!("Starting database migrations");

    match sqlx::migrate!("../migrations").run(pool).await {
        Ok(()) => {
            info!("All database migrations completed successfully");
            Ok(())
        }
        Err(e) => {
            warn!("Migration failed: {}", e);
            Err(e)
        }
    }
}

/// Creates the database if it doesn't exist
///
/// Used by the server when `DATABASE_AUTO_CREATE` is set, which is handy in
/// development. Production databases are expected to exist already.
pub async fn ensure_database_exists(database_url: &str) -> Result<(), sqlx::Error> {
    if !Postgres::database_exists(database_url).await? {
        info!("Database does not exist, creating it");
        Postgres::create_database(database_url).await?;
        info!("Database created successfully");
    } else {
        debug!("Database already exists");
    }

    Ok(())
}
