//! Admin account domain types.

use chrono::{DateTime, Utc};
use longing_core::{Email, UserId};
use secrecy::SecretString;
use serde::Serialize;

/// The administrative account (domain type).
///
/// Stored in `users` with `is_admin = TRUE`. The password hash never leaves
/// the repository layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdminUser {
    /// Unique user ID.
    pub id: UserId,
    /// Admin's email address.
    pub email: Email,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
}

/// Credentials used to create the admin account when none exists yet.
#[derive(Debug, Clone)]
pub struct AdminSeed {
    pub email: Email,
    /// Plain-text password, hashed with Argon2id before it is stored.
    pub password: SecretString,
}

/// `ADMIN_EMAIL` / `ADMIN_PASSWORD` as read from the environment.
///
/// Unvalidated; the bootstrap turns them into an [`AdminSeed`] when it runs
/// so a bad value fails that step instead of the whole process.
#[derive(Debug, Clone, Default)]
pub struct AdminSeedVars {
    pub email: Option<String>,
    pub password: Option<SecretString>,
}
