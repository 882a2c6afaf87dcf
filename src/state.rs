//! 应用状态管理
//!
//! 定义在请求处理器之间共享的只读状态。

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;
use sha2::{Digest, Sha512};
use std::sync::Arc;
use tera::Tera;
use tracing::warn;

use crate::config::AppConfig;
use crate::error::AppError;
use crate::google::{GoogleAuth, GoogleFormsClient};
use crate::services::{FormService, SessionStore};

/// 首页模板
const INDEX_TEMPLATE: &str = include_str!("../templates/index.html");

/// 应用共享状态
///
/// 所有字段都可廉价克隆，请求之间不共享可变数据
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    /// 会话 Cookie 加密密钥
    pub cookie_key: Key,
    pub session: SessionStore,
    pub auth: Arc<GoogleAuth>,
    pub forms: FormService,
    pub templates: Arc<Tera>,
}

impl AppState {
    /// 使用真实的 Google 客户端创建应用状态
    pub fn new(config: AppConfig) -> Result<Self, AppError> {
        let auth = Arc::new(GoogleAuth::new(&config).map_err(|e| AppError::Config(e.to_string()))?);
        let api = GoogleFormsClient::new(config.forms_api_base.clone())
            .map_err(|e| AppError::Config(e.to_string()))?;
        let forms = FormService::new(Arc::new(api), auth.clone());
        Self::with_services(config, auth, forms)
    }

    /// 使用给定的服务创建应用状态
    pub fn with_services(
        config: AppConfig,
        auth: Arc<GoogleAuth>,
        forms: FormService,
    ) -> Result<Self, AppError> {
        let mut templates = Tera::default();
        templates
            .add_raw_template("index.html", INDEX_TEMPLATE)
            .map_err(|e| AppError::Config(format!("加载模板失败: {}", e)))?;

        if config.session_secret.is_none() {
            warn!("SECRET_KEY is not set; sessions will not survive a restart");
        }

        Ok(Self {
            cookie_key: cookie_key(config.session_secret.as_deref()),
            session: SessionStore::new(config.secure_cookies()),
            config: Arc::new(config),
            auth,
            forms,
            templates: Arc::new(templates),
        })
    }
}

impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.cookie_key.clone()
    }
}

/// 由会话密钥派生 64 字节的 Cookie 密钥，未配置时随机生成
pub fn cookie_key(secret: Option<&str>) -> Key {
    match secret {
        Some(secret) => Key::from(Sha512::digest(secret.as_bytes()).as_slice()),
        None => Key::generate(),
    }
}
