//! Database migration commands.
//!
//! Migrations are embedded from `crates/server/migrations/`. Each revision
//! has an `.up.sql` and a `.down.sql` script.
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` - `PostgreSQL` connection string

use longing_server::config::{ConfigError, ServerConfig};
use longing_server::db::{self, migrations};
use sqlx::PgPool;
use thiserror::Error;

/// Errors that can occur while migrating.
#[derive(Debug, Error)]
pub enum MigrationError {
    /// `DATABASE_URL` is missing.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Database connection error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A migration script failed or the history does not match.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

async fn connect() -> Result<PgPool, MigrationError> {
    let database_url = ServerConfig::database_url_from_env()?;
    tracing::info!("Connecting to database...");
    Ok(db::connect(&database_url).await?)
}

/// Apply all pending migrations.
pub async fn up() -> Result<(), MigrationError> {
    let pool = connect().await?;

    tracing::info!("Running migrations...");
    migrations::upgrade(&pool).await?;

    tracing::info!("Migrations complete!");
    Ok(())
}

/// Revert migrations newer than `target`, or only the latest one.
pub async fn down(target: Option<i64>) -> Result<(), MigrationError> {
    let pool = connect().await?;

    let target = match target {
        Some(target) => target,
        None => match migrations::previous_version(&pool).await? {
            Some(target) => target,
            None => {
                tracing::info!("No applied migrations, nothing to revert");
                return Ok(());
            }
        },
    };

    tracing::info!(target_version = target, "Reverting migrations...");
    migrations::downgrade(&pool, target).await?;

    tracing::info!("Downgrade complete!");
    Ok(())
}

/// Print every known migration with its applied state.
pub async fn status() -> Result<(), MigrationError> {
    let pool = connect().await?;

    let known = migrations::status(&pool).await?;

    #[allow(clippy::print_stdout)]
    {
        for migration in known {
            let state = if migration.applied { "applied" } else { "pending" };
            println!("{:>14}  {:<8}  {}", migration.version, state, migration.description);
        }
    }
    Ok(())
}
