/// Configuration management for the API server
///
/// Configuration comes from environment variables, with a `.env` file loaded
/// first when present.
///
/// # Environment Variables
///
/// - `DATABASE_URL`: PostgreSQL connection string (required)
/// - `DATABASE_MAX_CONNECTIONS`: Pool size (default: 10)
/// - `DATABASE_AUTO_CREATE`: Create the database at startup if missing (default: false)
/// - `API_HOST`: Host to bind to (default: 0.0.0.0)
/// - `API_PORT`: Port to bind to (default: 8080)
/// - `APP_ENV`: `development` or `production` (default: development)
/// - `CORS_ORIGINS`: Comma-separated allowed origins, `*` for any (default: *)
/// - `JWT_SECRET`: Secret key for JWT signing, at least 32 characters (required)
/// - `RUST_LOG`: Log filter (default: taskwell_api=debug,taskwell_shared=debug,tower_http=debug)
/// - `LOG_FORMAT`: `json` for structured logs, anything else for human-readable
///
/// # Example
///
/// ```no_run
/// use taskwell_api::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("Server will listen on {}", config.bind_address());
/// # Ok(())
/// # }
/// ```

use anyhow::Context;
use std::env;
use std::fmt;
use std::str::FromStr;

pub const MIN_JWT_SECRET_LENGTH: usize = 32;

/// Complete application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub api: ApiConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
}

/// Deployment environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Production => "production",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Environment {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "production" | "prod" => Ok(Environment::Production),
            other => anyhow::bail!("APP_ENV must be 'development' or 'production', got '{other}'"),
        }
    }
}

/// API server configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
    pub environment: Environment,

    /// Allowed CORS origins; `*` allows any origin
    pub cors_origins: Vec<String>,
}

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    pub max_connections: u32,

    /// Create the database at startup if it doesn't exist
    pub auto_create: bool,
}

/// JWT configuration
#[derive(Clone)]
pub struct JwtConfig {
    /// Secret key for JWT signing
    ///
    /// Must be at least 32 characters. Generate with: `openssl rand -hex 32`
    pub secret: String,
}

impl fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"[redacted]")
            .finish()
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing or a value can't
    /// be parsed.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("API_HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = lookup("API_PORT")
            .unwrap_or_else(|| "8080".to_string())
            .parse::<u16>()
            .context("API_PORT must be a valid port number")?;

        let environment = match lookup("APP_ENV") {
            Some(value) => value.parse()?,
            None => Environment::default(),
        };

        let cors_origins: Vec<String> = lookup("CORS_ORIGINS")
            .unwrap_or_else(|| "*".to_string())
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        let database_url = lookup("DATABASE_URL")
            .ok_or_else(|| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;

        let max_connections = lookup("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|| "10".to_string())
            .parse::<u32>()
            .context("DATABASE_MAX_CONNECTIONS must be a positive integer")?;

        let auto_create = lookup("DATABASE_AUTO_CREATE")
            .map(|value| parse_flag(&value))
            .unwrap_or(false);

        let jwt_secret = lookup("JWT_SECRET")
            .ok_or_else(|| anyhow::anyhow!("JWT_SECRET environment variable is required"))?;

        if jwt_secret.chars().count() < MIN_JWT_SECRET_LENGTH {
            anyhow::bail!("JWT_SECRET must be at least {MIN_JWT_SECRET_LENGTH} characters long");
        }

        Ok(Self {
            api: ApiConfig {
                host,
                port,
                environment,
                cors_origins,
            },
            database: DatabaseConfig {
                url: database_url,
                max_connections,
                auto_create,
            },
            jwt: JwtConfig { secret: jwt_secret },
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }

    pub fn is_production(&self) -> bool {
        self.api.environment.is_production()
    }

    /// Pool settings for the shared database layer
    pub fn pool_config(&self) -> taskwell_shared::db::pool::DatabaseConfig {
        taskwell_shared::db::pool::DatabaseConfig {
            max_connections: self.database.max_connections,
            ..taskwell_shared::db::pool::DatabaseConfig::from_url(&self.database.url)
        }
    }
}
