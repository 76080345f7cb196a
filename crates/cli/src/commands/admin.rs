//! Admin account commands.
//!
//! # Usage
//!
//! ```bash
//! ADMIN_EMAIL=root@longing-heaven.com ADMIN_PASSWORD=... lh-cli admin bootstrap
//! ```
//!
//! Runs the same bootstrap the server runs at startup, but fails loudly
//! instead of continuing degraded.
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` - `PostgreSQL` connection string
//! - `ADMIN_EMAIL` / `ADMIN_PASSWORD` - Seed used when no admin exists

use longing_server::config::{ConfigError, ServerConfig};
use longing_server::db;
use longing_server::services::{BootstrapError, initialize_admin, parse_seed};
use thiserror::Error;

/// Errors that can occur during admin operations.
#[derive(Debug, Error)]
pub enum AdminError {
    /// Configuration is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Database connection error.
    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    /// Bootstrap failed.
    #[error("Bootstrap failed: {0}")]
    Bootstrap(#[from] BootstrapError),

    /// No admin exists and no seed is configured.
    #[error("No admin account exists; set ADMIN_EMAIL and ADMIN_PASSWORD to create one")]
    NoSeed,
}

/// Ensure an admin account exists.
pub async fn bootstrap() -> Result<(), AdminError> {
    let config = ServerConfig::from_env()?;
    let seed = parse_seed(&config.admin_seed)?;

    tracing::info!("Connecting to database...");
    let pool = db::connect(&config.database_url).await?;
    let mut conn = pool.acquire().await?;

    let admin = initialize_admin(&mut conn, seed.as_ref())
        .await?
        .ok_or(AdminError::NoSeed)?;

    tracing::info!(
        "Admin account ready. ID: {}, Email: {}",
        admin.id,
        admin.email
    );
    Ok(())
}
