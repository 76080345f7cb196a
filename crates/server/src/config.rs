//! Server configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `DATABASE_URL` - `PostgreSQL` connection string
//!
//! ## Optional
//! - `HOST` - Bind address (default: 0.0.0.0)
//! - `PORT` - Listen port (default: 8000)
//! - `REDIS_URL` - Redis connection string (cache disabled when unset)
//! - `STATIC_DIR` - Directory served under `/static` (default: app/static)
//! - `CORS_ALLOWED_ORIGINS` - Comma-separated origin allow-list
//! - `ADMIN_EMAIL` / `ADMIN_PASSWORD` - Seed for the admin bootstrap (both or neither);
//!   checked when the bootstrap runs, not here
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment tag

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use axum::http::HeaderValue;
use secrecy::SecretString;
use thiserror::Error;

use crate::models::AdminSeedVars;

/// Origins allowed to make credentialed cross-origin requests by default.
pub const DEFAULT_ALLOWED_ORIGINS: [&str; 4] = [
    "https://longing-heaven-frontend.onrender.com",
    "http://longing-heaven-frontend.onrender.com",
    "http://localhost:3000",
    "http://localhost:5173",
];

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: &str = "8000";
const DEFAULT_STATIC_DIR: &str = "app/static";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Redis connection URL, `None` runs without a cache
    pub redis_url: Option<SecretString>,
    /// Directory mounted under `/static` when it exists
    pub static_dir: PathBuf,
    /// CORS origin allow-list
    pub allowed_origins: Vec<HeaderValue>,
    /// Raw admin seed values, validated by the admin bootstrap
    pub admin_seed: AdminSeedVars,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name (e.g., "production", "staging")
    pub sentry_environment: Option<String>,
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env(lookup);

        let database_url = database_url(&env)?;
        let host = env
            .or_default("HOST", DEFAULT_HOST)
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("HOST".to_string(), e.to_string()))?;
        let port = env
            .or_default("PORT", DEFAULT_PORT)
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("PORT".to_string(), e.to_string()))?;
        let redis_url = env.optional("REDIS_URL").map(SecretString::from);
        let static_dir = PathBuf::from(env.or_default("STATIC_DIR", DEFAULT_STATIC_DIR));
        let allowed_origins = match env.optional("CORS_ALLOWED_ORIGINS") {
            Some(list) => parse_origins(&list)?,
            None => DEFAULT_ALLOWED_ORIGINS
                .iter()
                .map(|origin| HeaderValue::from_static(origin))
                .collect(),
        };
        let admin_seed = AdminSeedVars {
            email: env.optional("ADMIN_EMAIL"),
            password: env.optional("ADMIN_PASSWORD").map(SecretString::from),
        };

        Ok(Self {
            database_url,
            host,
            port,
            redis_url,
            static_dir,
            allowed_origins,
            admin_seed,
            sentry_dsn: env.optional("SENTRY_DSN"),
            sentry_environment: env.optional("SENTRY_ENVIRONMENT"),
        })
    }

    /// Load only `DATABASE_URL`, for tools that need nothing else.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingEnvVar` if it is unset or empty.
    pub fn database_url_from_env() -> Result<SecretString, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::database_url_from_lookup(|key| std::env::var(key).ok())
    }

    /// Read `DATABASE_URL` from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingEnvVar` if it is unset or empty.
    pub fn database_url_from_lookup<F>(lookup: F) -> Result<SecretString, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        database_url(&Env(lookup))
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Variable source with empty values treated as unset.
struct Env<F>(F);

impl<F: Fn(&str) -> Option<String>> Env<F> {
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|value| !value.trim().is_empty())
    }

    fn required(&self, key: &str) -> Result<String, ConfigError> {
        self.optional(key)
            .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
    }

    fn or_default(&self, key: &str, default: &str) -> String {
        self.optional(key).unwrap_or_else(|| default.to_string())
    }
}

/// Parse a comma-separated origin list into header values.
fn parse_origins(list: &str) -> Result<Vec<HeaderValue>, ConfigError> {
    let origins = list
        .split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(|origin| {
            let origin = origin.trim_end_matches('/');
            if !(origin.starts_with("http://") || origin.starts_with("https://")) {
                return Err(ConfigError::InvalidEnvVar(
                    "CORS_ALLOWED_ORIGINS".to_string(),
                    format!("origin must start with http:// or https:// (got '{origin}')"),
                ));
            }
            HeaderValue::from_str(origin).map_err(|e| {
                ConfigError::InvalidEnvVar("CORS_ALLOWED_ORIGINS".to_string(), e.to_string())
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    if origins.is_empty() {
        return Err(ConfigError::InvalidEnvVar(
            "CORS_ALLOWED_ORIGINS".to_string(),
            "no origins listed".to_string(),
        ));
    }
    Ok(origins)
}

fn database_url<F>(env: &Env<F>) -> Result<SecretString, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    env.required("DATABASE_URL").map(SecretString::from)
}
