//! Admin account repository.
//!
//! Works on a single borrowed connection so the caller decides the scope:
//! the startup bootstrap checks one out of the pool and returns it as soon
//! as the bootstrap finishes.

use chrono::{DateTime, Utc};
use longing_core::{Email, UserId};
use sqlx::PgConnection;

use super::RepositoryError;
use crate::models::AdminUser;

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct AdminUserRow {
    id: i32,
    email: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<AdminUserRow> for AdminUser {
    type Error = RepositoryError;

    fn try_from(row: AdminUserRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        Ok(Self {
            id: UserId::new(row.id),
            email,
            created_at: row.created_at,
        })
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for the admin account.
pub struct AdminUserRepository<'c> {
    conn: &'c mut PgConnection,
}

impl<'c> AdminUserRepository<'c> {
    #[must_use]
    pub const fn new(conn: &'c mut PgConnection) -> Self {
        Self { conn }
    }

    /// Get the oldest admin account, if any exists.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored email is invalid.
    pub async fn find_first(&mut self) -> Result<Option<AdminUser>, RepositoryError> {
        let row = sqlx::query_as::<_, AdminUserRow>(
            r"
            SELECT id, email, created_at
            FROM users
            WHERE is_admin
            ORDER BY id
            LIMIT 1
            ",
        )
        .fetch_optional(&mut *self.conn)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Create the admin account, or promote an existing user with that email.
    ///
    /// A promoted user keeps their current password.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    /// Returns `RepositoryError::DataCorruption` if the stored email is invalid.
    pub async fn create_or_promote(
        &mut self,
        email: &Email,
        password_hash: &str,
    ) -> Result<AdminUser, RepositoryError> {
        let row = sqlx::query_as::<_, AdminUserRow>(
            r"
            INSERT INTO users (email, hashed_password, is_admin)
            VALUES ($1, $2, TRUE)
            ON CONFLICT (email) DO UPDATE SET is_admin = TRUE
            RETURNING id, email, created_at
            ",
        )
        .bind(email.as_str())
        .bind(password_hash)
        .fetch_one(&mut *self.conn)
        .await?;

        row.try_into()
    }
}
