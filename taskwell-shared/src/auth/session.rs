/// Session lookup
///
/// The authorization gate doesn't know where sessions come from. It asks a
/// [`SessionProvider`] for the session attached to a request and works with
/// the opaque [`Session`] it gets back. The server uses
/// [`JwtSessionProvider`]; tests plug in their own.
///
/// # Example
///
/// ```
/// use axum::http::{header, HeaderMap, HeaderValue};
/// use taskwell_shared::auth::jwt::{create_token, Claims, TokenType};
/// use taskwell_shared::auth::session::{JwtSessionProvider, SessionProvider};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let secret = "a-secret-that-is-at-least-32-bytes-long";
/// let token = create_token(&Claims::new(42, TokenType::Access), secret)?;
///
/// let mut headers = HeaderMap::new();
/// headers.insert(header::AUTHORIZATION, HeaderValue::from_str(&format!("Bearer {token}"))?);
///
/// let provider = JwtSessionProvider::new(secret);
/// let session = provider.current_session(&headers).await?;
/// assert_eq!(session.map(|s| s.subject), Some("42".to_string()));
/// # Ok(())
/// # }
/// ```

use async_trait::async_trait;
use axum::http::{header, HeaderMap};
use tracing::debug;

use super::jwt::{validate_access_token, JwtError};

/// The session attached to a request
///
/// `subject` is whatever the provider stores as the user identifier; the
/// gate decides whether it is usable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub subject: String,
    pub email: Option<String>,
    pub name: Option<String>,
}

/// The session lookup itself failed
///
/// A missing or invalid session is `Ok(None)`, not an error.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SessionError {
    #[error("Session provider unavailable: {0}")]
    Unavailable(String),
}

/// Source of request sessions
#[async_trait]
pub trait SessionProvider: Send + Sync {
    async fn current_session(&self, headers: &HeaderMap) -> Result<Option<Session>, SessionError>;
}

/// Extracts the token from `Authorization: Bearer <token>`
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Sessions carried in HS256 access tokens
#[derive(Clone)]
pub struct JwtSessionProvider {
    secret: String,
}

impl JwtSessionProvider {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }
}

impl std::fmt::Debug for JwtSessionProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtSessionProvider")
            .field("secret", &"[redacted]")
            .finish()
    }
}

#[async_trait]
impl SessionProvider for JwtSessionProvider {
    /// Missing header, wrong scheme, bad signature, expiry and refresh
    /// tokens all mean "no session"
    async fn current_session(&self, headers: &HeaderMap) -> Result<Option<Session>, SessionError> {
        let Some(token) = bearer_token(headers) else {
            return Ok(None);
        };

        match validate_access_token(token, &self.secret) {
            Ok(claims) => Ok(Some(Session {
                subject: claims.sub,
                email: claims.email,
                name: claims.name,
            })),
            Err(JwtError::Create(reason)) => Err(SessionError::Unavailable(reason)),
            Err(e) => {
                debug!("Rejected bearer token: {}", e);
                Ok(None)
            }
        }
    }
}
