//! HTTP middleware stack.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (added in `main`)
//! 2. CORS (answers preflight requests before anything else runs)
//! 3. `TraceLayer` (request span with status and latency, see `routes::router`)

pub mod cors;

pub use cors::cors_layer;
