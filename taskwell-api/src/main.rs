//! # Taskwell API Server
//!
//! HTTP server for Taskwell: account registration and sign-in plus
//! per-user task management on PostgreSQL.
//!
//! ## Usage
//!
//! ```bash
//! DATABASE_URL=postgres://localhost/taskwell JWT_SECRET=... cargo run -p taskwell-api
//! ```

use anyhow::Context;
use taskwell_api::{
    app::{build_router, AppState},
    config::Config,
};
use taskwell_shared::db::{migrations, pool};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_LOG_FILTER: &str = "taskwell_api=debug,taskwell_shared=debug,tower_http=debug";

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());
    let json = std::env::var("LOG_FORMAT").is_ok_and(|format| format.eq_ignore_ascii_case("json"));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    tracing::info!("Shutdown signal received, draining connections...");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env must be loaded before the log filter is read
    dotenvy::dotenv().ok();
    init_tracing();

    tracing::info!(
        "Taskwell API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!(environment = %config.api.environment, "Configuration loaded");

    if config.database.auto_create {
        migrations::ensure_database_exists(&config.database.url)
            .await
            .context("Failed to create database")?;
    }

    let db = pool::create_pool(config.pool_config())
        .await
        .context("Failed to connect to database")?;

    migrations::run_migrations(&db)
        .await
        .context("Failed to run database migrations")?;

    let bind_address = config.bind_address();
    let app = build_router(AppState::new(db.clone(), config));

    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind {bind_address}"))?;
    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    pool::close_pool(db).await;
    tracing::info!("Server stopped");

    Ok(())
}
