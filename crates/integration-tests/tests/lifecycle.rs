//! Startup/shutdown tests with stubbed dependencies.
//!
//! Startup must never abort: every failing dependency is recorded and the
//! service keeps answering in degraded mode.

#![allow(clippy::unwrap_used)]

use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::Utc;
use longing_core::{Email, UserId};
use longing_integration_tests::{FakeRedis, offline_state, send, unreachable_pool};
use longing_server::lifecycle::{Lifecycle, Readiness, StepStatus};
use longing_server::models::{AdminSeedVars, AdminUser};
use longing_server::routes::router;
use longing_server::services::{
    AdminBootstrap, BootstrapError, CacheClient, CacheConnector, CacheError,
    DatabaseAdminBootstrap, RedisConnector,
};
use secrecy::SecretString;

struct Unconfigured;

impl CacheConnector for Unconfigured {
    async fn connect(&self) -> Result<Option<CacheClient>, CacheError> {
        Ok(None)
    }
}

struct ExistingAdmin;

impl AdminBootstrap for ExistingAdmin {
    async fn bootstrap(&self) -> Result<Option<AdminUser>, BootstrapError> {
        Ok(Some(AdminUser {
            id: UserId::new(1),
            email: Email::parse("root@longing-heaven.com").unwrap(),
            created_at: Utc::now(),
        }))
    }
}

fn ready_request() -> Request<Body> {
    Request::builder()
        .uri("/health/ready")
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn test_unreachable_redis_and_database_start_degraded() {
    let state = offline_state(&[]).unwrap();
    let lifecycle = Lifecycle::new(
        state.clone(),
        RedisConnector::new(Some(SecretString::from("redis://127.0.0.1:1/"))),
        DatabaseAdminBootstrap::new(unreachable_pool().unwrap(), AdminSeedVars::default()),
    );

    let report = lifecycle.startup().await;

    assert!(report.cache.is_failed());
    assert!(report.admin.is_failed());
    assert_eq!(report.readiness(), Readiness::Degraded);
    assert!(state.cache().await.is_none());

    // The root route keeps working after a degraded startup.
    let root = send(
        router(state.clone()),
        Request::builder().uri("/").body(Body::empty()).unwrap(),
    )
    .await
    .unwrap();
    assert_eq!(root.status, StatusCode::OK);

    let ready = send(router(state), ready_request()).await.unwrap();
    assert_eq!(ready.status, StatusCode::SERVICE_UNAVAILABLE);
    let body = ready.json();
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["startup"]["cache"]["status"], "failed");
    assert_eq!(body["startup"]["admin"]["status"], "failed");
}

#[tokio::test]
async fn test_missing_redis_url_is_skipped() {
    let state = offline_state(&[]).unwrap();
    let lifecycle = Lifecycle::new(state, RedisConnector::new(None), ExistingAdmin);

    let report = lifecycle.startup().await;

    assert!(matches!(report.cache, StepStatus::Skipped { .. }));
    assert_eq!(report.admin, StepStatus::Ready);
    assert_eq!(report.readiness(), Readiness::Ready);
}

#[tokio::test]
async fn test_readiness_needs_live_database_even_after_clean_startup() {
    let state = offline_state(&[]).unwrap();
    Lifecycle::new(state.clone(), Unconfigured, ExistingAdmin)
        .startup()
        .await;

    let ready = send(router(state), ready_request()).await.unwrap();

    assert_eq!(ready.status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(ready.json()["database"], "down");
    assert_eq!(ready.json()["startup"]["admin"]["status"], "ready");
}

#[tokio::test]
async fn test_shutdown_without_cache_is_noop() {
    let state = offline_state(&[]).unwrap();
    let lifecycle = Lifecycle::new(state.clone(), Unconfigured, ExistingAdmin);

    lifecycle.startup().await;
    lifecycle.shutdown().await;

    assert!(state.cache().await.is_none());
}

#[tokio::test]
async fn test_weak_admin_seed_starts_degraded() {
    let config = longing_integration_tests::config(&[
        ("ADMIN_EMAIL", "root@longing-heaven.com"),
        ("ADMIN_PASSWORD", "short"),
    ])
    .unwrap();
    let seed = config.admin_seed.clone();
    let state = longing_server::state::AppState::new(config, unreachable_pool().unwrap());
    let lifecycle = Lifecycle::new(
        state.clone(),
        Unconfigured,
        DatabaseAdminBootstrap::new(unreachable_pool().unwrap(), seed),
    );

    let report = lifecycle.startup().await;

    assert!(
        matches!(report.admin, StepStatus::Failed { ref error } if error.contains("ADMIN_PASSWORD"))
    );
    assert_eq!(report.readiness(), Readiness::Degraded);
    let root = send(
        router(state),
        Request::builder().uri("/").body(Body::empty()).unwrap(),
    )
    .await
    .unwrap();
    assert_eq!(root.status, StatusCode::OK);
}

#[tokio::test]
async fn test_half_configured_admin_seed_starts_degraded() {
    let state = offline_state(&[("ADMIN_EMAIL", "root")]).unwrap();
    let seed = state.config().admin_seed.clone();
    let lifecycle = Lifecycle::new(
        state,
        Unconfigured,
        DatabaseAdminBootstrap::new(unreachable_pool().unwrap(), seed),
    );

    let report = lifecycle.startup().await;

    assert!(report.admin.is_failed());
}

#[tokio::test]
async fn test_cache_connects_and_shutdown_closes_socket() {
    let mut redis = FakeRedis::start().await.unwrap();
    let state = offline_state(&[]).unwrap();
    let lifecycle = Lifecycle::new(
        state.clone(),
        RedisConnector::new(Some(SecretString::from(redis.url()))),
        ExistingAdmin,
    );

    let report = lifecycle.startup().await;

    assert_eq!(report.cache, StepStatus::Ready);
    state.cache().await.unwrap().ping().await.unwrap();

    let ready = send(router(state.clone()), ready_request()).await.unwrap();
    assert_eq!(ready.json()["cache"], "up");

    lifecycle.shutdown().await;

    assert!(state.cache().await.is_none());
    assert!(redis.wait_for_close(Duration::from_secs(2)).await);
}

#[tokio::test]
async fn test_shutdown_waits_for_borrowed_cache() {
    let mut redis = FakeRedis::start().await.unwrap();
    let state = offline_state(&[]).unwrap();
    let lifecycle = Lifecycle::new(
        state.clone(),
        RedisConnector::new(Some(SecretString::from(redis.url()))),
        ExistingAdmin,
    );
    lifecycle.startup().await;

    let borrowed = state.cache().await.unwrap();
    let blocked = tokio::time::timeout(Duration::from_millis(100), lifecycle.shutdown()).await;
    assert!(blocked.is_err(), "shutdown must not close a client in use");
    assert!(!redis.wait_for_close(Duration::from_millis(100)).await);

    drop(borrowed);
    lifecycle.shutdown().await;

    assert!(redis.wait_for_close(Duration::from_secs(2)).await);
}
