//! REST API 请求/响应模型

use serde::{Deserialize, Serialize};

/// 创建表单成功响应
#[derive(Debug, Serialize)]
pub struct CreateFormResponse {
    pub message: String,
    pub form_url: String,
}

/// OAuth 回调查询参数
#[derive(Debug, Default, Deserialize)]
pub struct OAuthCallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

/// 健康检查响应
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}
