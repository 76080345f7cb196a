//! Health check handlers.

use std::time::Duration;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use serde::Serialize;

use crate::error::{AppError, Result};
use crate::lifecycle::{Readiness, StartupReport};
use crate::state::AppState;

/// Upper bound on each live dependency check.
pub const CHECK_TIMEOUT: Duration = Duration::from_secs(2);

/// Live reachability of a dependency at the time of the check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DependencyState {
    Up,
    Down,
}

#[derive(Debug, Serialize)]
pub struct ReadinessResponse {
    pub status: Readiness,
    pub database: DependencyState,
    /// `None` when no cache client is held.
    pub cache: Option<DependencyState>,
    pub startup: StartupReport,
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
pub async fn liveness() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// 200 when no startup step failed and every held dependency answers now;
/// 503 with the same body when the service is degraded, and 503 with no
/// report while startup is still running.
pub async fn readiness(State(state): State<AppState>) -> Result<(StatusCode, Json<ReadinessResponse>)> {
    let startup = state
        .startup_report()
        .await
        .ok_or_else(|| AppError::Unavailable("startup in progress".to_string()))?;

    let database = check_database(&state).await;
    let cache = check_cache(&state).await;

    let status = if database == DependencyState::Up
        && cache != Some(DependencyState::Down)
        && startup.readiness() == Readiness::Ready
    {
        Readiness::Ready
    } else {
        Readiness::Degraded
    };
    let code = match status {
        Readiness::Ready => StatusCode::OK,
        Readiness::Degraded => StatusCode::SERVICE_UNAVAILABLE,
    };

    Ok((
        code,
        Json(ReadinessResponse {
            status,
            database,
            cache,
            startup,
        }),
    ))
}

async fn check_database(state: &AppState) -> DependencyState {
    let ping = sqlx::query("SELECT 1").execute(state.pool());
    match tokio::time::timeout(CHECK_TIMEOUT, ping).await {
        Ok(Ok(_)) => DependencyState::Up,
        Ok(Err(e)) => {
            tracing::warn!(error = %e, "Readiness check could not reach the database");
            DependencyState::Down
        }
        Err(_) => {
            tracing::warn!("Readiness check timed out waiting for the database");
            DependencyState::Down
        }
    }
}

async fn check_cache(state: &AppState) -> Option<DependencyState> {
    let cache = state.cache().await?;
    let status = match tokio::time::timeout(CHECK_TIMEOUT, cache.ping()).await {
        Ok(Ok(())) => DependencyState::Up,
        Ok(Err(e)) => {
            tracing::warn!(error = %e, "Readiness check could not reach Redis");
            DependencyState::Down
        }
        Err(_) => {
            tracing::warn!("Readiness check timed out waiting for Redis");
            DependencyState::Down
        }
    };
    Some(status)
}
