//! 页面端点

use axum::{extract::State, response::Html, routing::get, Router};
use axum_extra::extract::cookie::PrivateCookieJar;
use tera::Context;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// 首页，根据登录状态渲染
async fn index(State(state): State<AppState>, jar: PrivateCookieJar) -> AppResult<Html<String>> {
    let mut context = Context::new();
    context.insert("logged_in", &state.session.load_credentials(&jar).is_some());

    let html = state
        .templates
        .render("index.html", &context)
        .map_err(|e| AppError::Internal(format!("渲染首页失败: {}", e)))?;
    Ok(Html(html))
}

/// 创建页面路由
pub fn page_routes() -> Router<AppState> {
    Router::new().route("/", get(index))
}
