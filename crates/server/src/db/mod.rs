//! Database access for the bootstrap layer.
//!
//! ## Tables
//!
//! - `users` - Accounts; the admin row has `is_admin = TRUE`
//! - `orders` - Orders; `number` is fed by the `order_number_seq` sequence
//!
//! # Migrations
//!
//! Migrations are stored in `crates/server/migrations/` and run via:
//! ```bash
//! cargo run -p longing-cli -- migrate up
//! ```

pub mod admin_users;
pub mod migrations;

use std::str::FromStr;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use sqlx::PgPool;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use thiserror::Error;

pub use admin_users::AdminUserRepository;

/// Upper bound on waiting for a pooled connection.
pub const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),
}

/// Create a `PostgreSQL` pool that opens connections on first use.
///
/// No connection is attempted here, so an unreachable database does not
/// stop the server from starting; the first `acquire` reports it instead.
///
/// # Errors
///
/// Returns `sqlx::Error::Configuration` if the connection string is malformed.
pub fn create_pool(database_url: &SecretString) -> Result<PgPool, sqlx::Error> {
    let options = PgConnectOptions::from_str(database_url.expose_secret())?;
    Ok(PgPoolOptions::new()
        .max_connections(10)
        .acquire_timeout(ACQUIRE_TIMEOUT)
        .connect_lazy_with(options))
}

/// Create a `PostgreSQL` pool and verify connectivity up front.
///
/// Used by the CLI, where failing fast is preferable.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn connect(database_url: &SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(2)
        .acquire_timeout(ACQUIRE_TIMEOUT)
        .connect(database_url.expose_secret())
        .await
}
