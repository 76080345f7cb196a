//! Application state shared across handlers and lifecycle hooks.

use std::sync::Arc;

use sqlx::PgPool;
use tokio::sync::{RwLock, RwLockReadGuard};

use crate::config::ServerConfig;
use crate::lifecycle::StartupReport;
use crate::services::CacheClient;

/// Application context.
///
/// Cheaply cloneable via `Arc`. Holds the optional cache handle that
/// startup fills in and shutdown takes back, and the startup report served
/// by the readiness endpoint.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ServerConfig,
    pool: PgPool,
    cache: RwLock<Option<CacheClient>>,
    startup: RwLock<Option<StartupReport>>,
}

impl AppState {
    /// Create the application state. No dependency is contacted here.
    #[must_use]
    pub fn new(config: ServerConfig, pool: PgPool) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                cache: RwLock::new(None),
                startup: RwLock::new(None),
            }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Borrow the cache client, or `None` when Redis is disabled or unavailable.
    ///
    /// Shutdown waits for outstanding guards before it closes the client,
    /// so keep them short-lived.
    pub async fn cache(&self) -> Option<RwLockReadGuard<'_, CacheClient>> {
        RwLockReadGuard::try_map(self.inner.cache.read().await, Option::as_ref).ok()
    }

    /// Outcome of startup; `None` until the startup hook has finished.
    pub async fn startup_report(&self) -> Option<StartupReport> {
        self.inner.startup.read().await.clone()
    }

    pub(crate) async fn set_cache(&self, client: CacheClient) {
        *self.inner.cache.write().await = Some(client);
    }

    pub(crate) async fn take_cache(&self) -> Option<CacheClient> {
        self.inner.cache.write().await.take()
    }

    pub(crate) async fn set_startup_report(&self, report: StartupReport) {
        *self.inner.startup.write().await = Some(report);
    }
}
