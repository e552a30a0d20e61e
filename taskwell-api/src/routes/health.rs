/// Health check endpoint
///
/// # Endpoint
///
/// ```text
/// GET /health
/// ```
///
/// # Response
///
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0",
///   "database": "connected"
/// }
/// ```
///
/// A failing database reports `"degraded"` / `"disconnected"` with status
/// 200 so that load balancers can tell a live process from a dead one.

use crate::app::AppState;
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use taskwell_shared::db::pool;

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub database: String,
}

impl HealthResponse {
    fn from_database_check(database_ok: bool) -> Self {
        let (status, database) = if database_ok {
            ("healthy", "connected")
        } else {
            ("degraded", "disconnected")
        };

        Self {
            status: status.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            database: database.to_string(),
        }
    }
}

pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let database_ok = match pool::health_check(&state.db).await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!("Health check could not reach the database: {}", e);
            false
        }
    };

    Json(HealthResponse::from_database_check(database_ok))
}
