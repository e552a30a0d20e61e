/// User model and database operations
///
/// Users own tasks; deleting a user removes their tasks through the
/// `ON DELETE CASCADE` foreign key.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     id SERIAL PRIMARY KEY,
///     name VARCHAR(255),
///     email VARCHAR(255) NOT NULL,
///     password_hash VARCHAR(255),
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     CONSTRAINT users_email_key UNIQUE (email)
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use taskwell_shared::models::user::{CreateUser, User};
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> Result<(), sqlx::Error> {
/// let user = User::create(&pool, CreateUser {
///     email: "ada@example.com".to_string(),
///     name: Some("Ada".to_string()),
///     password_hash: Some("$argon2id$...".to_string()),
/// }).await?;
///
/// let found = User::find_by_email(&pool, "ada@example.com").await?;
/// assert_eq!(found.map(|u| u.id), Some(user.id));
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

/// Name of the unique constraint on `users.email`
pub const EMAIL_UNIQUE_CONSTRAINT: &str = "users_email_key";

/// A user account
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: i32,

    /// Optional display name
    pub name: Option<String>,

    /// Unique, stored trimmed and lowercased
    pub email: String,

    /// Argon2id hash; never serialized
    #[serde(skip_serializing, default)]
    pub password_hash: Option<String>,

    pub created_at: DateTime<Utc>,
}

/// Input for creating a user
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub email: String,
    pub name: Option<String>,

    /// Argon2id hash, not the plaintext password
    pub password_hash: Option<String>,
}

/// Profile changes; `None` keeps the stored value
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateProfile {
    pub name: Option<String>,
    pub email: Option<String>,
}

impl User {
    /// Inserts a new user
    ///
    /// # Errors
    ///
    /// A duplicate email fails with a unique violation on
    /// [`EMAIL_UNIQUE_CONSTRAINT`].
    pub async fn create(pool: &PgPool, data: CreateUser) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, name, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id, name, email, password_hash, created_at
            "#,
        )
        .bind(data.email)
        .bind(data.name)
        .bind(data.password_hash)
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_id(pool: &PgPool, id: i32) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, password_hash, created_at
            FROM users
            WHERE id = $1
            LIMIT 1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Finds a user by exact email
    ///
    /// Callers normalize the address first (`validation::account::validate_email`).
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, password_hash, created_at
            FROM users
            WHERE email = $1
            LIMIT 1
            "#,
        )
        .bind(email)
        .fetch_optional(pool)
        .await
    }

    /// Existence check run before registration
    ///
    /// Two concurrent registrations can both see `false`; the unique
    /// constraint still rejects the second insert.
    pub async fn email_exists(pool: &PgPool, email: &str) -> Result<bool, sqlx::Error> {
        let (exists,): (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
                .bind(email)
                .fetch_one(pool)
                .await?;

        Ok(exists)
    }

    /// Updates name and/or email, keeping fields that are `None`
    ///
    /// Returns `None` if the user no longer exists.
    pub async fn update_profile(
        pool: &PgPool,
        id: i32,
        data: UpdateProfile,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET name = COALESCE($2, name),
                email = COALESCE($3, email)
            WHERE id = $1
            RETURNING id, name, email, password_hash, created_at
            "#,
        )
        .bind(id)
        .bind(data.name)
        .bind(data.email)
        .fetch_optional(pool)
        .await
    }

    /// Permanently deletes a user and, by cascade, all their tasks
    ///
    /// Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: i32) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_password_hash_is_never_serialized() {
        let user = User {
            id: 1,
            name: Some("Ada".to_string()),
            email: "ada@example.com".to_string(),
            password_hash: Some("$argon2id$v=19$secret".to_string()),
            created_at: Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap(),
        };

        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["email"], "ada@example.com");
        assert_eq!(json["id"], 1);
    }

    #[test]
    fn test_update_profile_default_changes_nothing() {
        let update = UpdateProfile::default();
        assert!(update.name.is_none());
        assert!(update.email.is_none());
    }
}
