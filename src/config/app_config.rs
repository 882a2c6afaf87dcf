//! 应用配置管理
//!
//! 部署环境从环境变量读取 OAuth 客户端信息；本地开发时回退到
//! Google 控制台下载的 `client_secrets.json`。配置在启动时加载一次。

use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::AppError;
use crate::google::{FORMS_API_BASE, GOOGLE_AUTH_URI, GOOGLE_TOKEN_URI};

/// 默认客户端密钥文件
const CLIENT_SECRETS_FILE: &str = "client_secrets.json";

/// 应用配置结构体
#[derive(Clone)]
pub struct AppConfig {
    /// OAuth 客户端 ID
    pub client_id: String,
    /// OAuth 客户端密钥
    pub client_secret: String,
    /// 授权端点
    pub auth_uri: String,
    /// 令牌端点
    pub token_uri: String,
    /// 回调地址
    pub redirect_uri: String,
    /// 会话 Cookie 密钥，未设置时启动时随机生成
    pub session_secret: Option<String>,
    /// 本地开发模式（Cookie 不带 Secure）
    pub development: bool,
    /// 监听地址
    pub bind_addr: String,
    /// Forms API 基础 URL
    pub forms_api_base: String,
}

fn default_redirect_uri() -> String {
    "http://localhost:5000/auth/google/callback".to_string()
}

fn default_bind_addr() -> String {
    "127.0.0.1:5000".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            auth_uri: GOOGLE_AUTH_URI.to_string(),
            token_uri: GOOGLE_TOKEN_URI.to_string(),
            redirect_uri: default_redirect_uri(),
            session_secret: None,
            development: false,
            bind_addr: default_bind_addr(),
            forms_api_base: FORMS_API_BASE.to_string(),
        }
    }
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"***")
            .field("auth_uri", &self.auth_uri)
            .field("token_uri", &self.token_uri)
            .field("redirect_uri", &self.redirect_uri)
            .field("session_secret_set", &self.session_secret.is_some())
            .field("development", &self.development)
            .field("bind_addr", &self.bind_addr)
            .field("forms_api_base", &self.forms_api_base)
            .finish()
    }
}

/// `client_secrets.json` 文件格式
#[derive(Debug, Deserialize)]
struct ClientSecretsFile {
    web: Option<ClientSecrets>,
    installed: Option<ClientSecrets>,
}

#[derive(Debug, Deserialize)]
struct ClientSecrets {
    client_id: String,
    client_secret: String,
    auth_uri: Option<String>,
    token_uri: Option<String>,
    #[serde(default)]
    redirect_uris: Vec<String>,
}

impl AppConfig {
    /// 从进程环境变量加载配置
    pub fn from_env() -> Result<Self, AppError> {
        Self::load_with(|key| std::env::var(key).ok())
    }

    /// 使用给定的变量查找函数加载配置
    pub fn load_with<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let mut config = match (var("GOOGLE_CLIENT_ID"), var("GOOGLE_CLIENT_SECRET")) {
            (Some(client_id), Some(client_secret)) => Self {
                client_id,
                client_secret,
                ..Self::default()
            },
            _ => {
                let path = var("CLIENT_SECRETS_FILE")
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from(CLIENT_SECRETS_FILE));
                Self::from_client_secrets(&path)?
            }
        };

        if let Some(redirect_uri) = var("GOOGLE_REDIRECT_URI") {
            config.redirect_uri = redirect_uri;
        }
        if let Some(bind_addr) = var("BIND_ADDR") {
            config.bind_addr = bind_addr;
        }
        if let Some(base) = var("FORMS_API_BASE") {
            config.forms_api_base = base;
        }
        config.session_secret = var("SECRET_KEY");
        config.development = var("APP_ENV")
            .map(|env| env.eq_ignore_ascii_case("development"))
            .unwrap_or(false);

        Ok(config)
    }

    /// 从 Google 客户端密钥文件加载
    fn from_client_secrets(path: &Path) -> Result<Self, AppError> {
        let content = fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!(
                "GOOGLE_CLIENT_ID/GOOGLE_CLIENT_SECRET 未设置，且无法读取 {}: {}",
                path.display(),
                e
            ))
        })?;
        let file: ClientSecretsFile = serde_json::from_str(&content)
            .map_err(|e| AppError::Config(format!("解析 {} 失败: {}", path.display(), e)))?;

        let secrets = file.web.or(file.installed).ok_or_else(|| {
            AppError::Config(format!("{} 中缺少 \"web\" 配置", path.display()))
        })?;

        let defaults = Self::default();
        Ok(Self {
            client_id: secrets.client_id,
            client_secret: secrets.client_secret,
            auth_uri: secrets.auth_uri.unwrap_or(defaults.auth_uri),
            token_uri: secrets.token_uri.unwrap_or(defaults.token_uri),
            redirect_uri: secrets
                .redirect_uris
                .into_iter()
                .find(|uri| !uri.is_empty())
                .unwrap_or(defaults.redirect_uri),
            ..Self::default()
        })
    }

    /// 会话 Cookie 是否带 Secure 标记
    pub fn secure_cookies(&self) -> bool {
        !self.development
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.auth_uri, "https://accounts.google.com/o/oauth2/auth");
        assert_eq!(config.token_uri, "https://oauth2.googleapis.com/token");
        assert_eq!(config.bind_addr, "127.0.0.1:5000");
        assert!(config.secure_cookies());
    }

    #[test]
    fn test_load_from_env() {
        let config = AppConfig::load_with(lookup(&[
            ("GOOGLE_CLIENT_ID", "id"),
            ("GOOGLE_CLIENT_SECRET", "secret"),
            ("GOOGLE_REDIRECT_URI", "https://forms.example.com/auth/google/callback"),
            ("SECRET_KEY", "session-secret"),
        ]))
        .unwrap();

        assert_eq!(config.client_id, "id");
        assert_eq!(config.client_secret, "secret");
        assert_eq!(
            config.redirect_uri,
            "https://forms.example.com/auth/google/callback"
        );
        assert_eq!(config.session_secret.as_deref(), Some("session-secret"));
        assert!(!config.development);
        assert!(config.secure_cookies());
    }

    #[test]
    fn test_development_mode() {
        let config = AppConfig::load_with(lookup(&[
            ("GOOGLE_CLIENT_ID", "id"),
            ("GOOGLE_CLIENT_SECRET", "secret"),
            ("APP_ENV", "development"),
        ]))
        .unwrap();
        assert!(config.development);
        assert!(!config.secure_cookies());
        assert!(config.session_secret.is_none());
    }

    #[test]
    fn test_load_from_client_secrets_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("client_secrets.json");
        fs::write(
            &path,
            r#"{"web": {
                "client_id": "file-id",
                "client_secret": "file-secret",
                "auth_uri": "https://accounts.google.com/o/oauth2/auth",
                "token_uri": "https://oauth2.googleapis.com/token",
                "redirect_uris": ["http://localhost:5000/auth/google/callback"]
            }}"#,
        )
        .unwrap();

        let path_str = path.to_string_lossy().to_string();
        let config = AppConfig::load_with(lookup(&[
            ("CLIENT_SECRETS_FILE", path_str.as_str()),
            ("GOOGLE_CLIENT_ID", "only-id-is-not-enough"),
        ]))
        .unwrap();

        assert_eq!(config.client_id, "file-id");
        assert_eq!(config.client_secret, "file-secret");
        assert_eq!(
            config.redirect_uri,
            "http://localhost:5000/auth/google/callback"
        );
    }

    #[test]
    fn test_missing_client_secrets_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing.json");
        let path_str = path.to_string_lossy().to_string();

        let err = AppConfig::load_with(lookup(&[("CLIENT_SECRETS_FILE", path_str.as_str())]))
            .unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[test]
    fn test_debug_hides_secret() {
        let config = AppConfig {
            client_secret: "do-not-print".to_string(),
            ..AppConfig::default()
        };
        assert!(!format!("{:?}", config).contains("do-not-print"));
    }
}
