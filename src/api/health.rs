//! 健康检查端点

use axum::{routing::get, Json, Router};

use crate::models::HealthResponse;
use crate::state::AppState;

/// 存活探测，不访问 Google
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

pub fn health_routes() -> Router<AppState> {
    Router::new().route("/api/health", get(health))
}
