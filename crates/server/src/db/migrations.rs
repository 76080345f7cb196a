//! Embedded schema migrations.
//!
//! Revisions are reversible sqlx migrations under `crates/server/migrations/`,
//! applied in version order to form a linear history:
//!
//! ```text
//! 20250720000000_baseline          users, orders
//! 20250725200839_add_order_number  order_number_seq + orders.number
//! ```
//!
//! Each revision runs inside its own transaction. Errors are returned to the
//! caller untouched; rolling back is left to that transaction.

use std::collections::BTreeSet;

use serde::Serialize;
use sqlx::PgPool;
use sqlx::migrate::{Migrate, MigrateError, Migrator};

/// All revisions known to this build.
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Revision that creates the `users` and `orders` tables.
pub const BASELINE_VERSION: i64 = 20_250_720_000_000;

/// Revision that adds `orders.number` backed by `order_number_seq`.
pub const ORDER_NUMBER_VERSION: i64 = 20_250_725_200_839;

/// Applied state of one revision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MigrationStatus {
    pub version: i64,
    pub description: String,
    pub applied: bool,
}

/// Apply every pending revision.
///
/// Revisions that are already recorded in `_sqlx_migrations` are skipped,
/// so calling this repeatedly is safe.
///
/// # Errors
///
/// Returns `MigrateError` if a revision fails or the recorded history no
/// longer matches the embedded files.
pub async fn upgrade(pool: &PgPool) -> Result<(), MigrateError> {
    MIGRATOR.run(pool).await
}

/// Revert every applied revision newer than `target`.
///
/// # Errors
///
/// Returns `MigrateError` if a down script fails.
pub async fn downgrade(pool: &PgPool, target: i64) -> Result<(), MigrateError> {
    MIGRATOR.undo(pool, target).await
}

/// Revert the order-number revision, leaving the baseline in place.
///
/// # Errors
///
/// Returns `MigrateError` if the down script fails.
pub async fn downgrade_order_number(pool: &PgPool) -> Result<(), MigrateError> {
    downgrade(pool, BASELINE_VERSION).await
}

/// List known revisions in version order with their applied state.
///
/// # Errors
///
/// Returns `MigrateError` if the migrations table cannot be read.
pub async fn status(pool: &PgPool) -> Result<Vec<MigrationStatus>, MigrateError> {
    let applied = applied_versions(pool).await?;

    Ok(MIGRATOR
        .iter()
        .filter(|m| !m.migration_type.is_down_migration())
        .map(|m| MigrationStatus {
            version: m.version,
            description: m.description.to_string(),
            applied: applied.contains(&m.version),
        })
        .collect())
}

/// Target version that reverts only the most recently applied revision.
///
/// Returns `None` when nothing is applied.
///
/// # Errors
///
/// Returns `MigrateError` if the migrations table cannot be read.
pub async fn previous_version(pool: &PgPool) -> Result<Option<i64>, MigrateError> {
    let applied = applied_versions(pool).await?;
    Ok(target_before_latest(&applied))
}

async fn applied_versions(pool: &PgPool) -> Result<BTreeSet<i64>, MigrateError> {
    let mut conn = pool.acquire().await?;
    conn.ensure_migrations_table().await?;
    Ok(conn
        .list_applied_migrations()
        .await?
        .into_iter()
        .map(|m| m.version)
        .collect())
}

/// Version below the latest applied one (0 reverts everything).
fn target_before_latest(applied: &BTreeSet<i64>) -> Option<i64> {
    let mut newest_first = applied.iter().rev();
    newest_first.next()?;
    Some(newest_first.next().copied().unwrap_or(0))
}
