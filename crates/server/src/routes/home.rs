//! Root route handler.

use axum::Json;
use serde::Serialize;

pub const ROOT_MESSAGE: &str = "The main router of Longing for heaven application.";

#[derive(Debug, Serialize)]
pub struct RootResponse {
    pub data: &'static str,
}

/// `GET /`
pub async fn index() -> Json<RootResponse> {
    Json(RootResponse { data: ROOT_MESSAGE })
}
