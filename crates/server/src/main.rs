//! Longing for heaven - backend entrypoint.
//!
//! Serves the JSON API on `HOST:PORT` (default `0.0.0.0:8000`).
//!
//! # Startup order
//!
//! 1. Configuration, Sentry and tracing
//! 2. Lazy database pool (no connection is opened here)
//! 3. Router with CORS, static files and the root route
//! 4. Startup hook: Redis, then the admin account. Failures are logged and
//!    the process keeps going in degraded mode.
//! 5. Serve until Ctrl+C / SIGTERM, then the shutdown hook closes Redis.
//!
//! Under `systemfd --no-pid -s http::8000 -- cargo watch -x run` the
//! listener is inherited, so the server restarts on code changes without
//! dropping the socket.

#![cfg_attr(not(test), forbid(unsafe_code))]

use listenfd::ListenFd;
use longing_server::config::ServerConfig;
use longing_server::db;
use longing_server::lifecycle::Lifecycle;
use longing_server::routes;
use longing_server::services::{DatabaseAdminBootstrap, RedisConnector};
use longing_server::state::AppState;
use sentry::integrations::tracing as sentry_tracing;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &ServerConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main]
async fn main() {
    let config = ServerConfig::from_env().expect("Failed to load configuration");

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = init_sentry(&config);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "longing_server=info,tower_http=debug".into());

    // JSON on Render for structured log parsing, text locally
    let is_render = std::env::var("RENDER").is_ok();
    let json_layer =
        is_render.then(|| tracing_subscriber::fmt::layer().json().flatten_event(true));
    let text_layer = (!is_render).then(tracing_subscriber::fmt::layer);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    let pool = db::create_pool(&config.database_url).expect("Invalid DATABASE_URL");

    // NOTE: Migrations are NOT run automatically on startup.
    // Run them explicitly via: cargo run -p longing-cli -- migrate up

    let state = AppState::new(config.clone(), pool.clone());

    let app = routes::router(state.clone())
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction());

    let lifecycle = Lifecycle::new(
        state,
        RedisConnector::new(config.redis_url.clone()),
        DatabaseAdminBootstrap::new(pool, config.admin_seed.clone()),
    );
    lifecycle.startup().await;

    let listener = match ListenFd::from_env()
        .take_tcp_listener(0)
        .expect("Failed to read inherited listener")
    {
        Some(listener) => {
            listener
                .set_nonblocking(true)
                .expect("Failed to set inherited listener non-blocking");
            TcpListener::from_std(listener).expect("Failed to adopt inherited listener")
        }
        None => TcpListener::bind(config.socket_addr())
            .await
            .expect("Failed to bind to address"),
    };

    let addr = listener.local_addr().expect("Failed to read local address");
    tracing::info!("longing-server listening on {}", addr);

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!(error = %e, "Server error");
    }

    // Runs on clean and failed exits alike.
    lifecycle.shutdown().await;
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
