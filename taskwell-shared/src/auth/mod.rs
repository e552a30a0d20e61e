/// Authentication and authorization
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing
/// - [`jwt`]: Access and refresh token signing and validation
/// - [`session`]: The `SessionProvider` seam and its JWT implementation
/// - [`gate`]: Resolves a request to a `Principal` and validates path ids
///
/// # Example
///
/// ```no_run
/// use taskwell_shared::auth::gate::authenticate_user;
/// use taskwell_shared::auth::password::{hash_password, verify_password};
/// use taskwell_shared::auth::session::JwtSessionProvider;
/// use axum::http::HeaderMap;
///
/// # async fn example(headers: HeaderMap) -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("abc12345")?;
/// assert!(verify_password("abc12345", &hash)?);
///
/// let provider = JwtSessionProvider::new(std::env::var("JWT_SECRET")?);
/// let principal = authenticate_user(&provider, &headers).await?;
/// println!("request from user {}", principal.user_id);
/// # Ok(())
/// # }
/// ```

pub mod gate;
pub mod jwt;
pub mod password;
pub mod session;
