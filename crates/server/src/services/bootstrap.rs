//! Admin account bootstrap.
//!
//! Makes sure an administrative account exists. The routine is idempotent:
//! an existing admin is returned as-is, a configured seed creates one, and
//! without either the result is `None`.

use std::future::Future;

use argon2::Argon2;
use argon2::password_hash::{PasswordHasher, SaltString, rand_core::OsRng};
use longing_core::Email;
use secrecy::{ExposeSecret, SecretString};
use sqlx::{PgConnection, PgPool};
use thiserror::Error;

use crate::db::{AdminUserRepository, RepositoryError};
use crate::models::{AdminSeed, AdminSeedVars, AdminUser};

const MIN_ADMIN_PASSWORD_LENGTH: usize = 12;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "changeme",
    "password",
    "admin123",
    "qwerty",
    "placeholder",
    "replace",
    "your-",
    "example",
];

/// Errors that can occur during the admin bootstrap.
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// `ADMIN_EMAIL` / `ADMIN_PASSWORD` are incomplete or unacceptable.
    #[error("invalid {var}: {reason}")]
    InvalidSeed { var: &'static str, reason: String },

    /// No connection could be checked out of the pool.
    #[error("could not acquire a database connection: {0}")]
    Acquire(#[source] sqlx::Error),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,
}

/// Runs the admin bootstrap during startup.
pub trait AdminBootstrap: Send + Sync {
    fn bootstrap(&self) -> impl Future<Output = Result<Option<AdminUser>, BootstrapError>> + Send;
}

/// Bootstraps the admin against the application database.
///
/// The seed is validated first; a connection is then checked out for the
/// duration of the call only.
#[derive(Debug, Clone)]
pub struct DatabaseAdminBootstrap {
    pool: PgPool,
    seed: AdminSeedVars,
}

impl DatabaseAdminBootstrap {
    #[must_use]
    pub const fn new(pool: PgPool, seed: AdminSeedVars) -> Self {
        Self { pool, seed }
    }
}

impl AdminBootstrap for DatabaseAdminBootstrap {
    async fn bootstrap(&self) -> Result<Option<AdminUser>, BootstrapError> {
        let seed = parse_seed(&self.seed)?;
        let mut conn = self.pool.acquire().await.map_err(BootstrapError::Acquire)?;
        initialize_admin(&mut conn, seed.as_ref()).await
    }
}

/// Turn the raw seed variables into a usable seed.
///
/// Both values or neither must be set. The email must parse and the
/// password must be at least 12 characters and not look like a placeholder.
///
/// # Errors
///
/// Returns `BootstrapError::InvalidSeed` naming the offending variable.
pub fn parse_seed(vars: &AdminSeedVars) -> Result<Option<AdminSeed>, BootstrapError> {
    match (&vars.email, &vars.password) {
        (None, None) => Ok(None),
        (Some(_), None) => Err(BootstrapError::InvalidSeed {
            var: "ADMIN_PASSWORD",
            reason: "must be set together with ADMIN_EMAIL".to_string(),
        }),
        (None, Some(_)) => Err(BootstrapError::InvalidSeed {
            var: "ADMIN_EMAIL",
            reason: "must be set together with ADMIN_PASSWORD".to_string(),
        }),
        (Some(email), Some(password)) => {
            let email = Email::parse(email).map_err(|e| BootstrapError::InvalidSeed {
                var: "ADMIN_EMAIL",
                reason: e.to_string(),
            })?;
            validate_admin_password(password)?;
            Ok(Some(AdminSeed {
                email,
                password: password.clone(),
            }))
        }
    }
}

/// Reject short or placeholder admin passwords.
fn validate_admin_password(password: &SecretString) -> Result<(), BootstrapError> {
    let value = password.expose_secret();
    if value.chars().count() < MIN_ADMIN_PASSWORD_LENGTH {
        return Err(BootstrapError::InvalidSeed {
            var: "ADMIN_PASSWORD",
            reason: format!("must be at least {MIN_ADMIN_PASSWORD_LENGTH} characters"),
        });
    }

    let lower = value.to_lowercase();
    if let Some(pattern) = PLACEHOLDER_PATTERNS.iter().find(|p| lower.contains(*p)) {
        return Err(BootstrapError::InvalidSeed {
            var: "ADMIN_PASSWORD",
            reason: format!("appears to be a placeholder (contains '{pattern}')"),
        });
    }
    Ok(())
}

/// Ensure an admin account exists.
///
/// # Errors
///
/// Returns `BootstrapError::Repository` if a query fails and
/// `BootstrapError::PasswordHash` if the seed password cannot be hashed.
pub async fn initialize_admin(
    conn: &mut PgConnection,
    seed: Option<&AdminSeed>,
) -> Result<Option<AdminUser>, BootstrapError> {
    let mut repo = AdminUserRepository::new(conn);

    if let Some(existing) = repo.find_first().await? {
        tracing::debug!(admin_id = %existing.id, "Admin account already present");
        return Ok(Some(existing));
    }

    let Some(seed) = seed else {
        return Ok(None);
    };

    let hash = hash_password(seed.password.expose_secret())?;
    let admin = repo.create_or_promote(&seed.email, &hash).await?;
    tracing::info!(admin_id = %admin.id, email = %admin.email, "Admin account created");
    Ok(Some(admin))
}

/// Hash a password using Argon2id.
fn hash_password(password: &str) -> Result<String, BootstrapError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| BootstrapError::PasswordHash)
}
