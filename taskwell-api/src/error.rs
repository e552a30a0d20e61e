/// Error handling for the API server
///
/// Every handler returns `Result<T, ApiError>`. `ApiError` renders the error
/// envelope `{ "error": string, "details"?: [string] | string }` with the
/// matching status code.
///
/// Internal failures never put the underlying error in the body here. The
/// detail rides along as a response extension and
/// [`crate::middleware::error_details`] decides whether to expose it.
///
/// # Example
///
/// ```no_run
/// use taskwell_api::error::{ApiError, ApiResult};
/// use axum::Json;
/// use sqlx::PgPool;
///
/// async fn count_users(pool: PgPool) -> ApiResult<Json<i64>> {
///     let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
///         .fetch_one(&pool)
///         .await
///         .map_err(ApiError::operation("count users"))?;
///     Ok(Json(count))
/// }
/// ```

use axum::{
    extract::rejection::QueryRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use taskwell_shared::auth::{
    gate::{GateError, INVALID_TASK_ID, SESSION_UNAVAILABLE},
    jwt::JwtError,
    password::PasswordError,
};
use taskwell_shared::models::user::EMAIL_UNIQUE_CONSTRAINT;

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

pub const INVALID_JSON: &str = "Invalid JSON in request body. Please check your request format.";
pub const TASK_NOT_FOUND: &str = "Task not found or access denied";
pub const EMAIL_TAKEN: &str = "User with this email already exists";

/// Unified API error type
#[derive(Debug)]
pub enum ApiError {
    /// Bad request (400)
    BadRequest(String),

    /// Bad request (400) listing every validation message
    Validation {
        message: &'static str,
        errors: Vec<String>,
    },

    /// Unauthorized (401)
    Unauthorized(String),

    /// Not found (404)
    NotFound(String),

    /// Conflict (409), e.g. duplicate email
    Conflict(String),

    /// Internal server error (500)
    ///
    /// `message` is what clients see; `detail` is the underlying error.
    Internal { message: String, detail: String },

    /// Service unavailable (503)
    ServiceUnavailable(String),
}

/// `details` field of the error envelope
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ErrorDetails {
    /// Validation messages
    Messages(Vec<String>),

    /// Underlying error text, development only
    Internal(String),
}

/// Error response format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<ErrorDetails>,
}

/// Response extension carried by 500 responses
#[derive(Debug, Clone)]
pub struct InternalErrorDetail {
    pub message: String,
    pub detail: String,
}

fn failed_to(operation: &str) -> String {
    format!("Failed to {operation}. Please try again later.")
}

impl ApiError {
    /// Body validation failure
    pub fn validation(errors: Vec<String>) -> Self {
        ApiError::Validation {
            message: "Validation failed",
            errors,
        }
    }

    /// Query string validation failure
    pub fn invalid_query(errors: Vec<String>) -> Self {
        ApiError::Validation {
            message: "Invalid query parameters",
            errors,
        }
    }

    pub fn task_not_found() -> Self {
        ApiError::NotFound(TASK_NOT_FOUND.to_string())
    }

    /// 500 for a named operation
    pub fn internal(operation: &str, detail: impl fmt::Display) -> Self {
        ApiError::Internal {
            message: failed_to(operation),
            detail: detail.to_string(),
        }
    }

    /// Maps a storage error for a named operation, e.g.
    /// `.map_err(ApiError::operation("create task"))`
    ///
    /// A unique violation on the email constraint becomes a 409.
    pub fn operation(operation: &'static str) -> impl FnOnce(sqlx::Error) -> ApiError {
        move |err| {
            if is_email_conflict(&err) {
                ApiError::Conflict(EMAIL_TAKEN.to_string())
            } else {
                ApiError::internal(operation, err)
            }
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) | ApiError::Validation { .. } => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

fn is_email_conflict(err: &sqlx::Error) -> bool {
    err.as_database_error().is_some_and(|db_err| {
        db_err.is_unique_violation()
            && db_err
                .constraint()
                .map_or(true, |constraint| constraint == EMAIL_UNIQUE_CONSTRAINT)
    })
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            ApiError::Validation { message, errors } => {
                write!(f, "{}: {} errors", message, errors.len())
            }
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            ApiError::Internal { message, detail } => {
                write!(f, "Internal error: {} ({})", message, detail)
            }
            ApiError::ServiceUnavailable(msg) => write!(f, "Service unavailable: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        let (body, internal) = match self {
            ApiError::Validation { message, errors } => (
                ErrorResponse {
                    error: message.to_string(),
                    details: Some(ErrorDetails::Messages(errors)),
                },
                None,
            ),
            ApiError::Internal { message, detail } => {
                tracing::error!("{}: {}", message, detail);
                (
                    ErrorResponse {
                        error: message.clone(),
                        details: None,
                    },
                    Some(InternalErrorDetail { message, detail }),
                )
            }
            ApiError::BadRequest(msg)
            | ApiError::Unauthorized(msg)
            | ApiError::NotFound(msg)
            | ApiError::Conflict(msg)
            | ApiError::ServiceUnavailable(msg) => (
                ErrorResponse {
                    error: msg,
                    details: None,
                },
                None,
            ),
        };

        let mut response = (status, Json(body)).into_response();
        if let Some(internal) = internal {
            response.extensions_mut().insert(internal);
        }
        response
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        ApiError::operation("process request")(err)
    }
}

impl From<GateError> for ApiError {
    fn from(err: GateError) -> Self {
        match err {
            GateError::Unauthenticated(msg) => ApiError::Unauthorized(msg.to_string()),
            GateError::ServiceUnavailable => {
                ApiError::ServiceUnavailable(SESSION_UNAVAILABLE.to_string())
            }
            GateError::InvalidResourceId => ApiError::BadRequest(INVALID_TASK_ID.to_string()),
        }
    }
}

impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        ApiError::internal("process credentials", err)
    }
}

impl From<JwtError> for ApiError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::Create(_) => ApiError::internal("issue token", err),
            JwtError::Expired => {
                ApiError::Unauthorized("Token has expired. Please sign in again.".to_string())
            }
            JwtError::Invalid(_) | JwtError::WrongType { .. } => {
                ApiError::Unauthorized("Invalid token. Please sign in again.".to_string())
            }
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::invalid_query(vec![rejection.body_text()])
    }
}
