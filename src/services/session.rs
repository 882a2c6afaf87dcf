//! 会话凭证存储
//!
//! 凭证集和 OAuth state 保存在加密签名的 Cookie 中，浏览器关闭即失效。

use axum_extra::extract::cookie::{Cookie, PrivateCookieJar, SameSite};
use tracing::warn;

use crate::error::AppError;
use crate::google::CredentialSet;

/// 凭证 Cookie 名
pub const CREDENTIALS_COOKIE: &str = "credentials";

/// OAuth state Cookie 名
pub const STATE_COOKIE: &str = "oauth_state";

/// 会话 Cookie 策略
#[derive(Debug, Clone, Copy)]
pub struct SessionStore {
    secure: bool,
}

impl SessionStore {
    pub fn new(secure: bool) -> Self {
        Self { secure }
    }

    /// 构建会话 Cookie（不设置 Max-Age，即会话级 Cookie）
    fn cookie(&self, name: &'static str, value: String) -> Cookie<'static> {
        Cookie::build((name, value))
            .path("/")
            .http_only(true)
            .secure(self.secure)
            .same_site(SameSite::Lax)
            .build()
    }

    fn removal(name: &'static str) -> Cookie<'static> {
        Cookie::build(name).path("/").build()
    }

    /// 读取凭证，Cookie 缺失或内容损坏时返回 None
    pub fn load_credentials(&self, jar: &PrivateCookieJar) -> Option<CredentialSet> {
        let cookie = jar.get(CREDENTIALS_COOKIE)?;
        match serde_json::from_str(cookie.value()) {
            Ok(credentials) => Some(credentials),
            Err(e) => {
                warn!("Discarding unreadable credentials cookie: {}", e);
                None
            }
        }
    }

    /// 保存凭证
    pub fn store_credentials(
        &self,
        jar: PrivateCookieJar,
        credentials: &CredentialSet,
    ) -> Result<PrivateCookieJar, AppError> {
        let value = serde_json::to_string(credentials)
            .map_err(|e| AppError::Internal(format!("序列化凭证失败: {}", e)))?;
        Ok(jar.add(self.cookie(CREDENTIALS_COOKIE, value)))
    }

    /// 清除凭证，强制用户重新登录
    pub fn clear_credentials(&self, jar: PrivateCookieJar) -> PrivateCookieJar {
        jar.remove(Self::removal(CREDENTIALS_COOKIE))
    }

    /// 保存 OAuth state
    pub fn store_state(&self, jar: PrivateCookieJar, state: &str) -> PrivateCookieJar {
        jar.add(self.cookie(STATE_COOKIE, state.to_string()))
    }

    /// 取出 OAuth state（一次性）
    pub fn take_state(&self, jar: PrivateCookieJar) -> (PrivateCookieJar, Option<String>) {
        let state = jar.get(STATE_COOKIE).map(|c| c.value().to_string());
        let jar = if state.is_some() {
            jar.remove(Self::removal(STATE_COOKIE))
        } else {
            jar
        };
        (jar, state)
    }
}
