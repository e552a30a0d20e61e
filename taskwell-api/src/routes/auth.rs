/// Authentication endpoints
///
/// # Endpoints
///
/// - `POST /auth/register` - Register a new user
/// - `POST /auth/login` - Exchange credentials for tokens
/// - `POST /auth/refresh` - Exchange a refresh token for a new access token
/// - `GET /auth/session` - Report the current session (authenticated)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult, EMAIL_TAKEN},
    extract::JsonBody,
    response::ApiResponse,
};
use axum::{extract::State, Extension};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use taskwell_shared::{
    auth::{
        gate::Principal,
        jwt::{self, Claims, TokenType},
        password::{self, PasswordError},
    },
    models::user::{CreateUser, User},
    validation::account::{
        email_rule, validate_email, validate_password, validate_text, TextRules,
    },
};
use tracing::{info, warn};
use validator::Validate;

const INVALID_CREDENTIALS: &str = "Invalid email or password";

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[serde(default)]
    #[validate(custom(function = "email_rule"))]
    pub email: String,

    #[serde(default)]
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Tokens plus the signed-in user
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub user: User,
    pub access_token: String,
    pub refresh_token: String,
}

/// Refresh token request
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "Refresh token is required"))]
    pub refresh_token: String,
}

/// Refresh token response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    pub access_token: String,
}

/// Session report
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub authenticated: bool,
    pub user: User,
}

/// Flattens `validator` errors into sorted messages
fn validation_messages(errors: &validator::ValidationErrors) -> Vec<String> {
    let mut messages: Vec<String> = errors
        .field_errors()
        .values()
        .flat_map(|errors| errors.iter())
        .map(|error| {
            error
                .message
                .as_ref()
                .map(|m| m.to_string())
                .unwrap_or_else(|| format!("Invalid value ({})", error.code))
        })
        .collect();
    messages.sort();
    messages
}

/// Argon2 is CPU-bound; keep it off the async workers
async fn run_blocking<T, F>(work: F) -> ApiResult<T>
where
    F: FnOnce() -> Result<T, PasswordError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| ApiError::internal("process credentials", e))?
        .map_err(ApiError::from)
}

fn issue_tokens(user: &User, secret: &str) -> ApiResult<(String, String)> {
    let claims = |token_type| {
        Claims::new(user.id, token_type)
            .with_profile(Some(user.email.as_str()), user.name.as_deref())
    };

    let access = jwt::create_token(&claims(TokenType::Access), secret)?;
    let refresh = jwt::create_token(&claims(TokenType::Refresh), secret)?;
    Ok((access, refresh))
}

/// Register a new user
///
/// # Endpoint
///
/// ```text
/// POST /auth/register
/// Content-Type: application/json
///
/// { "name": "Ada", "email": "ada@example.com", "password": "abc12345" }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Malformed JSON or validation failed
/// - `409 Conflict`: Email already registered
/// - `500 Internal Server Error`: Storage or hashing failure
pub async fn register(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<Value>,
) -> ApiResult<ApiResponse<User>> {
    let name = validate_text(body.get("name"), TextRules::display_name(true));
    let email = validate_email(body.get("email").and_then(Value::as_str));
    let password = validate_password(body.get("password").and_then(Value::as_str));

    let (name, email, password) = match (name, email, password) {
        (Ok(name), Ok(email), Ok(password)) => (name, email, password),
        (name, email, password) => {
            let errors = [name.err(), email.err(), password.err()]
                .into_iter()
                .flatten()
                .flatten()
                .collect();
            return Err(ApiError::validation(errors));
        }
    };

    if User::email_exists(&state.db, &email)
        .await
        .map_err(ApiError::operation("register user"))?
    {
        return Err(ApiError::Conflict(EMAIL_TAKEN.to_string()));
    }

    let password_hash = run_blocking(move || password::hash_password(&password)).await?;

    let user = User::create(
        &state.db,
        CreateUser {
            email,
            name,
            password_hash: Some(password_hash),
        },
    )
    .await
    .map_err(ApiError::operation("register user"))?;

    info!(user_id = user.id, "User registered");
    Ok(ApiResponse::created(user).with_message("User created successfully"))
}

/// Login endpoint
///
/// # Endpoint
///
/// ```text
/// POST /auth/login
/// Content-Type: application/json
///
/// { "email": "ada@example.com", "password": "abc12345" }
/// ```
///
/// # Response
///
/// ```json
/// {
///   "success": true,
///   "message": "Login successful",
///   "data": { "user": { ... }, "accessToken": "eyJ...", "refreshToken": "eyJ..." }
/// }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed
/// - `401 Unauthorized`: Unknown email or wrong password
/// - `500 Internal Server Error`: Server error
pub async fn login(
    State(state): State<AppState>,
    JsonBody(mut req): JsonBody<LoginRequest>,
) -> ApiResult<ApiResponse<LoginResponse>> {
    req.email = req.email.trim().to_lowercase();

    req.validate()
        .map_err(|e| ApiError::validation(validation_messages(&e)))?;

    let user = User::find_by_email(&state.db, &req.email)
        .await
        .map_err(ApiError::operation("sign in"))?;

    let Some((user, stored_hash)) = user.and_then(|u| {
        let hash = u.password_hash.clone()?;
        Some((u, hash))
    }) else {
        warn!("Login attempt for unknown or password-less account");
        return Err(ApiError::Unauthorized(INVALID_CREDENTIALS.to_string()));
    };

    let candidate = req.password;
    let valid = run_blocking(move || password::verify_password(&candidate, &stored_hash)).await?;
    if !valid {
        warn!(user_id = user.id, "Login attempt with wrong password");
        return Err(ApiError::Unauthorized(INVALID_CREDENTIALS.to_string()));
    }

    let (access_token, refresh_token) = issue_tokens(&user, state.jwt_secret())?;

    info!(user_id = user.id, "User signed in");
    Ok(ApiResponse::ok(LoginResponse {
        user,
        access_token,
        refresh_token,
    })
    .with_message("Login successful"))
}

/// Token refresh endpoint
///
/// ```text
/// POST /auth/refresh
/// Content-Type: application/json
///
/// { "refreshToken": "eyJ..." }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Token missing
/// - `401 Unauthorized`: Invalid or expired refresh token
pub async fn refresh(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<RefreshRequest>,
) -> ApiResult<ApiResponse<RefreshResponse>> {
    req.validate()
        .map_err(|e| ApiError::validation(validation_messages(&e)))?;

    let access_token = jwt::refresh_access_token(&req.refresh_token, state.jwt_secret())?;

    Ok(ApiResponse::ok(RefreshResponse { access_token }))
}

/// Reports the signed-in user
///
/// # Errors
///
/// - `401 Unauthorized`: No valid session
/// - `404 Not Found`: The session's user no longer exists
/// - `503 Service Unavailable`: Session lookup failed
pub async fn session(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> ApiResult<ApiResponse<SessionResponse>> {
    let user = User::find_by_id(&state.db, principal.user_id)
        .await
        .map_err(ApiError::operation("check session"))?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(ApiResponse::ok(SessionResponse {
        authenticated: true,
        user,
    })
    .with_message("Authentication successful"))
}
