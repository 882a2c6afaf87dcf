//! API 路由模块

mod auth;
mod forms;
mod health;
mod pages;

pub use auth::auth_routes;
pub use forms::forms_routes;
pub use health::health_routes;
pub use pages::page_routes;

use axum::Router;

use crate::state::AppState;

/// 创建所有路由
pub fn create_api_routes(state: AppState) -> Router {
    Router::new()
        .merge(page_routes())
        .merge(health_routes())
        .merge(auth_routes())
        .merge(forms_routes())
        .with_state(state)
}
