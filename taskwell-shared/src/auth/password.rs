/// Password hashing with Argon2id
///
/// Hashes are stored in PHC string format, so the parameters and salt
/// travel with the hash and [`verify_password`] needs nothing else.
///
/// Parameters follow the OWASP baseline for Argon2id: 19 MiB of memory,
/// 2 passes, 1 lane.
///
/// # Example
///
/// ```
/// use taskwell_shared::auth::password::{hash_password, verify_password};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("abc12345")?;
///
/// assert!(verify_password("abc12345", &hash)?);
/// assert!(!verify_password("abc12346", &hash)?);
/// # Ok(())
/// # }
/// ```

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};

const MEMORY_COST_KIB: u32 = 19 * 1024;
const TIME_COST: u32 = 2;
const PARALLELISM: u32 = 1;

/// Error type for password hashing operations
#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("Failed to hash password: {0}")]
    Hash(String),

    /// Stored hash isn't a parseable PHC string
    #[error("Invalid password hash format: {0}")]
    InvalidHash(String),

    #[error("Failed to verify password: {0}")]
    Verify(String),
}

fn hasher() -> Result<Argon2<'static>, PasswordError> {
    let params = Params::new(MEMORY_COST_KIB, TIME_COST, PARALLELISM, None)
        .map_err(|e| PasswordError::Hash(format!("invalid parameters: {e}")))?;

    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}

/// Hashes a password with a fresh random salt
///
/// # Errors
///
/// Returns [`PasswordError::Hash`] if hashing fails.
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);

    let hash = hasher()?
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| PasswordError::Hash(e.to_string()))?;

    Ok(hash.to_string())
}

/// Checks a password against a stored hash
///
/// Returns `Ok(false)` for a wrong password, and for a stored hash that is
/// well-formed PHC but carries no usable digest. Errors are reserved for
/// hashes that can't be parsed or verified at all.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
    let parsed = PasswordHash::new(hash).map_err(|e| PasswordError::InvalidHash(e.to_string()))?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(PasswordError::Verify(e.to_string())),
    }
}
