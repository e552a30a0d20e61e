/// JWT token generation and validation
///
/// Tokens are signed with HS256. The subject is the user's numeric id as a
/// string, which is what the authorization gate expects to parse.
///
/// # Token Types
///
/// - **Access Token**: 24 hours, sent as `Authorization: Bearer <token>`
/// - **Refresh Token**: 30 days, only accepted by `POST /auth/refresh`
///
/// # Example
///
/// ```
/// use taskwell_shared::auth::jwt::{create_token, validate_access_token, Claims, TokenType};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let secret = "a-secret-that-is-at-least-32-bytes-long";
/// let claims = Claims::new(42, TokenType::Access).with_profile(Some("ada@example.com"), None);
/// let token = create_token(&claims, secret)?;
///
/// let validated = validate_access_token(&token, secret)?;
/// assert_eq!(validated.sub, "42");
/// # Ok(())
/// # }
/// ```

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Value of the `iss` claim on every token
pub const ISSUER: &str = "taskwell";

/// Error type for JWT operations
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    #[error("Failed to create token: {0}")]
    Create(String),

    #[error("Token has expired")]
    Expired,

    /// Signature, issuer or format check failed
    #[error("Invalid token: {0}")]
    Invalid(String),

    #[error("Expected {expected} token, got {actual} token")]
    WrongType {
        expected: &'static str,
        actual: &'static str,
    },
}

/// Token type identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

impl TokenType {
    pub fn default_expiration(&self) -> Duration {
        match self {
            TokenType::Access => Duration::hours(24),
            TokenType::Refresh => Duration::days(30),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TokenType::Access => "access",
            TokenType::Refresh => "refresh",
        }
    }
}

/// JWT claims
///
/// Standard claims plus the token type and the user's email and name, which
/// the session endpoint reports without a database round trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: String,

    pub iss: String,

    pub iat: i64,

    pub exp: i64,

    pub nbf: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    pub token_type: TokenType,
}

impl Claims {
    /// Claims for `user_id` with the token type's default lifetime
    pub fn new(user_id: i32, token_type: TokenType) -> Self {
        Self::with_expiration(user_id, token_type, token_type.default_expiration())
    }

    pub fn with_expiration(user_id: i32, token_type: TokenType, expires_in: Duration) -> Self {
        let now = Utc::now();

        Self {
            sub: user_id.to_string(),
            iss: ISSUER.to_string(),
            iat: now.timestamp(),
            exp: (now + expires_in).timestamp(),
            nbf: now.timestamp(),
            email: None,
            name: None,
            token_type,
        }
    }

    /// Attaches the user's email and display name
    pub fn with_profile(mut self, email: Option<&str>, name: Option<&str>) -> Self {
        self.email = email.map(str::to_string);
        self.name = name.map(str::to_string);
        self
    }

    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }
}

/// Signs claims into a token string
pub fn create_token(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    let key = EncodingKey::from_secret(secret.as_bytes());

    encode(&Header::new(Algorithm::HS256), claims, &key).map_err(|e| JwtError::Create(e.to_string()))
}

/// Verifies signature, expiry, not-before and issuer, then returns the claims
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, JwtError> {
    let key = DecodingKey::from_secret(secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[ISSUER]);
    validation.validate_exp = true;
    validation.validate_nbf = true;

    decode::<Claims>(token, &key, &validation)
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => JwtError::Expired,
            _ => JwtError::Invalid(e.to_string()),
        })
}

fn expect_type(claims: Claims, expected: TokenType) -> Result<Claims, JwtError> {
    if claims.token_type == expected {
        Ok(claims)
    } else {
        Err(JwtError::WrongType {
            expected: expected.as_str(),
            actual: claims.token_type.as_str(),
        })
    }
}

/// Validates a token and requires it to be an access token
pub fn validate_access_token(token: &str, secret: &str) -> Result<Claims, JwtError> {
    expect_type(validate_token(token, secret)?, TokenType::Access)
}

/// Validates a token and requires it to be a refresh token
pub fn validate_refresh_token(token: &str, secret: &str) -> Result<Claims, JwtError> {
    expect_type(validate_token(token, secret)?, TokenType::Refresh)
}

/// Issues a new access token from a valid refresh token
///
/// The subject and profile claims carry over unchanged.
pub fn refresh_access_token(refresh_token: &str, secret: &str) -> Result<String, JwtError> {
    let refresh = validate_refresh_token(refresh_token, secret)?;
    let now = Utc::now();

    let access = Claims {
        iat: now.timestamp(),
        nbf: now.timestamp(),
        exp: (now + TokenType::Access.default_expiration()).timestamp(),
        token_type: TokenType::Access,
        ..refresh
    };

    create_token(&access, secret)
}
