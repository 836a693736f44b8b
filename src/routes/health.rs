use axum::{routing::get, Router};
use serde::Serialize;
use time::OffsetDateTime;

use crate::{response::ApiResponse, state::AppState};

#[derive(Debug, Serialize)]
pub struct Health {
    pub status: &'static str,
    pub version: &'static str,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health))
}

/// Liveness only; does not touch the database.
pub async fn health() -> ApiResponse<Health> {
    ApiResponse::ok(Health {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        timestamp: OffsetDateTime::now_utc(),
    })
    .message("API is running")
}
