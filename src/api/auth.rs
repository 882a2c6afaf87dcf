//! Google 登录相关端点

use axum::{
    extract::{Query, State},
    response::Redirect,
    routing::get,
    Router,
};
use axum_extra::extract::cookie::PrivateCookieJar;
use tracing::{error, info, warn};

use crate::error::{AppError, AppResult};
use crate::models::OAuthCallbackQuery;
use crate::state::AppState;

/// 跳转到 Google 授权页
async fn login(State(state): State<AppState>, jar: PrivateCookieJar) -> (PrivateCookieJar, Redirect) {
    let (url, csrf_state) = state.auth.authorize_url();
    let jar = state.session.store_state(jar, csrf_state.secret());
    info!(
        "Redirecting to Google authorization page: redirect_uri={}",
        state.config.redirect_uri
    );
    (jar, Redirect::to(&url))
}

/// 授权回调：校验 state，用授权码换取凭证并写入会话
async fn callback(
    State(state): State<AppState>,
    jar: PrivateCookieJar,
    Query(query): Query<OAuthCallbackQuery>,
) -> AppResult<(PrivateCookieJar, Redirect)> {
    let (jar, expected) = state.session.take_state(jar);
    match (expected.as_deref(), query.state.as_deref()) {
        (Some(expected), Some(received)) if expected == received => {}
        _ => {
            warn!("OAuth callback state mismatch");
            return Err(AppError::StateMismatch);
        }
    }

    if let Some(reason) = query.error {
        warn!("Google authorization was not granted: {}", reason);
        return Err(AppError::BadRequest(format!(
            "Authorization failed: {}",
            reason
        )));
    }

    let code = query
        .code
        .filter(|c| !c.is_empty())
        .ok_or_else(|| AppError::BadRequest("Missing authorization code".to_string()))?;

    let credentials = state.auth.exchange_code(&code).await.map_err(|e| {
        error!("OAuth code exchange failed: {}", e);
        AppError::Unexpected(e.to_string())
    })?;

    let jar = state.session.store_credentials(jar, &credentials)?;
    info!("User logged in");
    Ok((jar, Redirect::to("/")))
}

/// 登出：清除会话中的凭证
async fn logout(State(state): State<AppState>, jar: PrivateCookieJar) -> (PrivateCookieJar, Redirect) {
    info!("User logged out");
    (state.session.clear_credentials(jar), Redirect::to("/"))
}

/// 创建登录路由
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/google", get(login))
        .route("/auth/google/callback", get(callback))
        .route("/logout", get(logout))
}
