//! 统一错误处理模块
//!
//! 定义应用级错误类型，并实现 axum 的 IntoResponse trait 以便自动转换为 HTTP 响应。

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// 应用错误枚举
#[derive(Error, Debug)]
pub enum AppError {
    /// 会话中没有凭证
    #[error("Not authenticated")]
    NotAuthenticated,

    /// OAuth 回调 state 校验失败
    #[error("Invalid state parameter")]
    StateMismatch,

    /// 请求参数错误
    #[error("{0}")]
    BadRequest(String),

    /// Forms API 拒绝了请求
    #[error("{0}")]
    Upstream(String),

    /// 其他异常，可能与凭证有关
    #[error("An error occurred: {0}. Please log in again.")]
    Unexpected(String),

    /// 配置相关错误
    #[error("配置错误: {0}")]
    Config(String),

    /// 内部错误
    #[error("内部错误: {0}")]
    Internal(String),
}

impl AppError {
    /// 是否需要清除会话中的凭证
    pub fn invalidates_credentials(&self) -> bool {
        matches!(self, AppError::Unexpected(_))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::NotAuthenticated => StatusCode::UNAUTHORIZED,
            AppError::StateMismatch => {
                return (StatusCode::BAD_REQUEST, self.to_string()).into_response();
            }
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

/// 便捷类型别名
pub type AppResult<T> = Result<T, AppError>;
