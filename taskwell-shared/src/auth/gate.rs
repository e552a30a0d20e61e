/// Authorization gate
///
/// Turns a request's session into a [`Principal`] carrying the numeric user
/// id, and checks path-supplied resource ids. Everything downstream takes
/// the principal as an explicit argument.
///
/// # Example
///
/// ```
/// use axum::http::HeaderMap;
/// use taskwell_shared::auth::gate::{authenticate_user, validate_resource_id, GateError};
/// use taskwell_shared::auth::session::JwtSessionProvider;
///
/// # async fn example() {
/// let provider = JwtSessionProvider::new("a-secret-that-is-at-least-32-bytes-long");
///
/// let result = authenticate_user(&provider, &HeaderMap::new()).await;
/// assert!(matches!(result, Err(GateError::Unauthenticated(_))));
///
/// assert_eq!(validate_resource_id("17").ok(), Some(17));
/// assert!(validate_resource_id("abc").is_err());
/// # }
/// ```

use axum::http::HeaderMap;
use tracing::{error, warn};

use super::session::SessionProvider;

pub const SIGN_IN_REQUIRED: &str =
    "Authentication required. Please sign in to access this resource.";
pub const INVALID_SESSION: &str = "Invalid user session. Please sign in again.";
pub const SESSION_UNAVAILABLE: &str =
    "Authentication service unavailable. Please try again later.";
pub const INVALID_TASK_ID: &str = "Invalid task ID. Task ID must be a positive number.";

/// The authenticated caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Principal {
    pub user_id: i32,
}

/// Why the gate refused a request
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GateError {
    /// No usable session (401)
    #[error("{0}")]
    Unauthenticated(&'static str),

    /// The session provider failed (503)
    #[error("{}", SESSION_UNAVAILABLE)]
    ServiceUnavailable,

    /// A path id isn't a positive integer (400)
    #[error("{}", INVALID_TASK_ID)]
    InvalidResourceId,
}

/// Parses the leading decimal digits of `raw`, ignoring leading whitespace
/// and anything after the digits
fn leading_integer(raw: &str) -> Option<i64> {
    let raw = raw.trim_start();
    let (sign, rest) = match raw.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, raw.strip_prefix('+').unwrap_or(raw)),
    };

    let digits_end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    let digits = &rest[..digits_end];
    if digits.is_empty() {
        return None;
    }

    // Saturate on overflow so huge values still fail the range check
    Some(digits.parse::<i64>().map(|n| sign * n).unwrap_or(i64::MAX))
}

/// Resolves the caller for a request
///
/// # Errors
///
/// - [`GateError::Unauthenticated`] when there is no session or its subject
///   isn't a positive integer
/// - [`GateError::ServiceUnavailable`] when the provider itself fails
pub async fn authenticate_user(
    provider: &dyn SessionProvider,
    headers: &HeaderMap,
) -> Result<Principal, GateError> {
    let session = match provider.current_session(headers).await {
        Ok(Some(session)) => session,
        Ok(None) => return Err(GateError::Unauthenticated(SIGN_IN_REQUIRED)),
        Err(e) => {
            error!("Session lookup failed: {}", e);
            return Err(GateError::ServiceUnavailable);
        }
    };

    match leading_integer(&session.subject).and_then(|id| i32::try_from(id).ok()) {
        Some(user_id) if user_id > 0 => Ok(Principal { user_id }),
        _ => {
            warn!(subject = %session.subject, "Session subject is not a user id");
            Err(GateError::Unauthenticated(INVALID_SESSION))
        }
    }
}

/// Validates a task id taken from the request path
pub fn validate_resource_id(raw: &str) -> Result<i32, GateError> {
    leading_integer(raw)
        .and_then(|id| i32::try_from(id).ok())
        .filter(|id| *id > 0)
        .ok_or(GateError::InvalidResourceId)
}
