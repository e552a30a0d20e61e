/// Application state and router builder
///
/// This module defines the shared application state and provides
/// a function to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use taskwell_api::{app::AppState, config::Config};
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let state = AppState::new(pool, config);
/// let app = taskwell_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::{config::Config, error::ApiError, middleware::error_details::expose_internal_details};
use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method},
    middleware::{from_fn_with_state, Next},
    response::Response,
    routing::{get, post, put},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use taskwell_shared::auth::{
    gate::authenticate_user,
    session::{JwtSessionProvider, SessionProvider},
};
use tower_http::{
    compression::CompressionLayer,
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned for each request via Axum's `State` extractor; every field is a
/// cheap handle.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    pub config: Arc<Config>,

    /// Where request sessions come from
    pub sessions: Arc<dyn SessionProvider>,
}

impl AppState {
    /// Creates state that reads sessions from JWT bearer tokens
    pub fn new(db: PgPool, config: Config) -> Self {
        let sessions = Arc::new(JwtSessionProvider::new(config.jwt.secret.clone()));

        Self {
            db,
            config: Arc::new(config),
            sessions,
        }
    }

    /// Replaces the session provider
    pub fn with_session_provider(mut self, sessions: Arc<dyn SessionProvider>) -> Self {
        self.sessions = sessions;
        self
    }

    /// Gets JWT secret for token operations
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── GET  /health              # Health check (public)
/// ├── /auth/
/// │   ├── POST /register        # public
/// │   ├── POST /login           # public
/// │   ├── POST /refresh         # public
/// │   └── GET  /session         # authenticated
/// ├── PUT  /users/me            # authenticated
/// └── /tasks                    # authenticated
///     ├── GET    /              # List with filters and sort
///     ├── POST   /              # Create
///     ├── GET    /stats         # Aggregate counts
///     ├── GET    /:id
///     ├── PUT    /:id           # Partial update
///     └── DELETE /:id
/// ```
///
/// # Middleware Stack
///
/// Outermost first:
/// 1. CORS (tower-http CorsLayer)
/// 2. Compression
/// 3. Logging (tower-http TraceLayer)
/// 4. Development-only internal error details
/// 5. Principal resolution (authenticated routes only)
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let public_routes = Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/auth/register", post(routes::auth::register))
        .route("/auth/login", post(routes::auth::login))
        .route("/auth/refresh", post(routes::auth::refresh));

    let protected_routes = Router::new()
        .route("/auth/session", get(routes::auth::session))
        .route("/users/me", put(routes::users::update_profile))
        .route(
            "/tasks",
            get(routes::tasks::list_tasks).post(routes::tasks::create_task),
        )
        .route("/tasks/stats", get(routes::tasks::task_stats))
        .route(
            "/tasks/:id",
            get(routes::tasks::get_task)
                .put(routes::tasks::update_task)
                .delete(routes::tasks::delete_task),
        )
        .route_layer(from_fn_with_state(state.clone(), require_principal));

    let cors = if state.config.api.cors_origins.iter().any(|origin| origin == "*") {
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(from_fn_with_state(state.clone(), expose_internal_details))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(CompressionLayer::new())
        .layer(cors)
        .with_state(state)
}

/// Resolves the caller and injects the `Principal` into request extensions
///
/// Runs before any body parsing or validation, so unauthenticated requests
/// are refused first.
async fn require_principal(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let principal = authenticate_user(state.sessions.as_ref(), req.headers()).await?;
    req.extensions_mut().insert(principal);

    Ok(next.run(req).await)
}
