//! CORS policy for the browser frontend.

use axum::http::HeaderValue;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};

/// Build the CORS layer for an origin allow-list.
///
/// Credentials are allowed, so methods and headers cannot be the `*`
/// wildcard; the layer mirrors whatever the preflight asks for instead.
/// Origins outside the list get no `Access-Control-Allow-Origin` header.
#[must_use]
pub fn cors_layer(allowed_origins: &[HeaderValue]) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed_origins.iter().cloned()))
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}
