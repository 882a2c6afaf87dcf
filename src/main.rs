//! Questionnaire to Google Forms bridge - Rust Backend
//!
//! 使用 axum 框架构建的后端服务：Google 登录后把问卷 JSON 转换成 Google 表单。

use anyhow::Context;
use axum::Router;
use std::net::SocketAddr;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod api;
mod config;
mod error;
mod google;
mod models;
mod services;
mod state;

use api::create_api_routes;
use config::AppConfig;
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 初始化日志
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "forms_bridge=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting questionnaire to Google Forms backend...");

    // 加载配置
    let config = AppConfig::from_env().context("加载配置失败")?;
    info!(
        "Config loaded: client_id={}, redirect_uri={}, development={}",
        config.client_id, config.redirect_uri, config.development
    );

    let addr: SocketAddr = config
        .bind_addr
        .parse()
        .with_context(|| format!("无效的监听地址: {}", config.bind_addr))?;

    // 创建共享状态
    let state = AppState::new(config).context("初始化应用状态失败")?;

    // 构建路由
    let app = Router::new()
        .merge(create_api_routes(state))
        .layer(TraceLayer::new_for_http());

    info!("Server listening on: {}", addr);

    // 启动服务器
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("绑定 {} 失败", addr))?;
    axum::serve(listener, app).await.context("服务器异常退出")?;

    Ok(())
}
