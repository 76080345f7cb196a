//! Startup and shutdown hooks.
//!
//! Startup runs once before the server accepts traffic, shutdown once after
//! it stops. Every dependency is attempted independently and no failure is
//! allowed to abort the process: the service starts degraded instead and
//! the outcome of each step is kept in a [`StartupReport`].
//!
//! Routes are registered when the router is built, before startup runs.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::services::{AdminBootstrap, CacheConnector};
use crate::state::AppState;

/// Outcome of one startup step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StepStatus {
    Ready,
    /// Intentionally not initialized (e.g. not configured).
    Skipped { reason: String },
    Failed { error: String },
}

impl StepStatus {
    #[must_use]
    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

/// Aggregate health after startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Readiness {
    Ready,
    /// At least one dependency failed; the service runs without it.
    Degraded,
}

/// Per-dependency result of the startup hook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StartupReport {
    pub cache: StepStatus,
    pub admin: StepStatus,
    pub completed_at: DateTime<Utc>,
}

impl StartupReport {
    #[must_use]
    pub const fn readiness(&self) -> Readiness {
        if self.cache.is_failed() || self.admin.is_failed() {
            Readiness::Degraded
        } else {
            Readiness::Ready
        }
    }
}

/// Drives the startup and shutdown hooks.
pub struct Lifecycle<C, A> {
    state: AppState,
    cache: C,
    admin: A,
}

impl<C, A> Lifecycle<C, A>
where
    C: CacheConnector,
    A: AdminBootstrap,
{
    #[must_use]
    pub const fn new(state: AppState, cache: C, admin: A) -> Self {
        Self {
            state,
            cache,
            admin,
        }
    }

    /// Initialize dependencies; never fails.
    pub async fn startup(&self) -> StartupReport {
        tracing::info!("Startup: initializing application");

        let cache = self.start_cache().await;
        let admin = self.start_admin().await;
        let report = StartupReport {
            cache,
            admin,
            completed_at: Utc::now(),
        };

        match report.readiness() {
            Readiness::Ready => tracing::info!("Startup complete"),
            Readiness::Degraded => tracing::warn!(
                cache = ?report.cache,
                admin = ?report.admin,
                "Startup complete in degraded mode"
            ),
        }

        self.state.set_startup_report(report.clone()).await;
        report
    }

    async fn start_cache(&self) -> StepStatus {
        match self.cache.connect().await {
            Ok(Some(client)) => {
                self.state.set_cache(client).await;
                tracing::info!("Redis initialized");
                StepStatus::Ready
            }
            Ok(None) => {
                tracing::warn!("Redis not configured, running without cache");
                StepStatus::Skipped {
                    reason: "REDIS_URL is not set".to_string(),
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to connect to Redis");
                StepStatus::Failed {
                    error: e.to_string(),
                }
            }
        }
    }

    async fn start_admin(&self) -> StepStatus {
        match self.admin.bootstrap().await {
            Ok(Some(admin)) => {
                tracing::info!(admin_id = %admin.id, "Admin account initialized");
                StepStatus::Ready
            }
            Ok(None) => {
                tracing::warn!("Could not create or fetch the admin account");
                StepStatus::Skipped {
                    reason: "no admin account and no ADMIN_EMAIL/ADMIN_PASSWORD seed".to_string(),
                }
            }
            Err(e) => {
                // Keep serving; the rest of the API may not need the admin.
                tracing::error!(critical = true, error = %e, "Admin bootstrap failed during startup");
                StepStatus::Failed {
                    error: e.to_string(),
                }
            }
        }
    }

    /// Release dependencies. A missing cache handle is a no-op.
    pub async fn shutdown(&self) {
        if let Some(client) = self.state.take_cache().await {
            client.close();
            tracing::info!("Redis connection closed");
        }
        tracing::info!("Shutdown complete");
    }
}
