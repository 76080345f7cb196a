//! HTTP routes.
//!
//! # Route Structure
//!
//! ```text
//! GET  /              - Root greeting
//! GET  /health        - Liveness check
//! GET  /health/ready  - Readiness with per-dependency startup status
//! GET  /static/*      - Static assets (only when STATIC_DIR exists)
//! *                   - JSON 404
//! ```
//!
//! Feature routers (orders, users, admin panel) are merged in by their own
//! crates and are not part of this layer.

pub mod health;
pub mod home;

use std::path::Path;

use axum::{Router, routing::get};
use tower_http::services::ServeDir;
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use crate::error::AppError;
use crate::middleware::cors_layer;
use crate::state::AppState;

/// Build the application router.
///
/// Routes are attached here, once, before the startup hook runs.
pub fn router(state: AppState) -> Router {
    let config = state.config();
    let routes = Router::new()
        .route("/", get(home::index))
        .route("/health", get(health::liveness))
        .route("/health/ready", get(health::readiness));

    mount_static(routes, &config.static_dir)
        .fallback(not_found)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .layer(cors_layer(&config.allowed_origins))
        .with_state(state)
}

/// Serve `dir` under `/static` if it exists; otherwise leave the prefix unrouted.
fn mount_static(routes: Router<AppState>, dir: &Path) -> Router<AppState> {
    if dir.is_dir() {
        tracing::info!(dir = %dir.display(), "Serving static files under /static");
        routes.nest_service("/static", ServeDir::new(dir))
    } else {
        tracing::warn!(
            dir = %dir.display(),
            "Static directory not found, /static is not mounted"
        );
        routes
    }
}

async fn not_found() -> AppError {
    AppError::NotFound
}
