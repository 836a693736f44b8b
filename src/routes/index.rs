use axum::{routing::get, Router};
use serde::Serialize;

use crate::{response::ApiResponse, state::AppState};

#[derive(Debug, Serialize)]
pub struct ApiIndex {
    pub version: &'static str,
    pub endpoints: Vec<&'static str>,
}

pub fn index_routes() -> Router<AppState> {
    Router::new().route("/", get(index))
}

pub async fn index() -> ApiResponse<ApiIndex> {
    ApiResponse::ok(ApiIndex {
        version: env!("CARGO_PKG_VERSION"),
        endpoints: vec![
            "GET /api/health",
            "POST /api/auth/login",
            "GET /api/auth/verify",
            "GET /api/tasks",
            "GET /api/tasks/:id",
            "POST /api/tasks",
            "PUT /api/tasks/:id",
            "DELETE /api/tasks/:id",
        ],
    })
    .message("Welcome to the Post'On API")
}
