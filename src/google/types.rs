//! Google 接入相关类型定义

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// 到期前多少秒即视为过期
const EXPIRY_SKEW_SECS: i64 = 60;

/// 凭证集
///
/// 以当前用户身份调用 Forms API 所需的全部信息。值不可变，刷新会得到新值。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialSet {
    /// 访问令牌
    pub token: String,
    /// 刷新令牌
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// 令牌端点
    pub token_uri: String,
    pub client_id: String,
    pub client_secret: String,
    /// 已授予的权限范围
    #[serde(default)]
    pub scopes: Vec<String>,
    /// 访问令牌过期时间
    #[serde(default)]
    pub expiry: Option<DateTime<Utc>>,
}

impl CredentialSet {
    /// 访问令牌是否已过期（未知过期时间视为未过期）
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        match self.expiry {
            Some(expiry) => now + Duration::seconds(EXPIRY_SKEW_SECS) >= expiry,
            None => false,
        }
    }

    /// 是否可以刷新
    pub fn can_refresh(&self) -> bool {
        self.refresh_token
            .as_deref()
            .map(|t| !t.is_empty())
            .unwrap_or(false)
    }
}

/// 令牌脱敏
pub fn mask_token(token: &str) -> String {
    let chars: Vec<char> = token.chars().collect();
    if chars.len() <= 8 {
        "*".repeat(chars.len())
    } else {
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{}...{}", head, tail)
    }
}

/// OAuth 错误类型
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// 端点配置无效
    #[error("OAuth 配置错误: {0}")]
    Config(String),

    /// 令牌端点交换失败
    #[error("令牌交换失败: {0}")]
    TokenExchange(String),

    /// 没有刷新令牌
    #[error("没有可用的刷新令牌")]
    NoRefreshToken,
}

/// Forms API 错误类型
#[derive(Debug, thiserror::Error)]
pub enum FormsError {
    /// HTTP 请求错误
    #[error("HTTP 请求失败: {0}")]
    HttpError(#[from] reqwest::Error),

    /// API 返回错误
    #[error("API 错误 ({status}): {message}")]
    ApiError { status: u16, message: String },

    /// JSON 解析错误
    #[error("JSON 解析失败: {0}")]
    JsonError(#[from] serde_json::Error),
}
