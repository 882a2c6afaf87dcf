//! Google OAuth2 授权码流程
//!
//! 基于 `oauth2` crate：生成授权 URL、用授权码换取令牌、用刷新令牌续期。

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use oauth2::basic::{BasicClient, BasicTokenResponse};
use oauth2::{
    AuthType, AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken, EndpointNotSet,
    EndpointSet, RedirectUrl, RefreshToken, Scope, TokenResponse, TokenUrl,
};
use reqwest::Client;
use tracing::{debug, info};

use super::endpoints::FORMS_BODY_SCOPE;
use super::types::{AuthError, CredentialSet};
use crate::config::AppConfig;

type GoogleClient =
    BasicClient<EndpointSet, EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointSet>;

/// 访问令牌续期
#[async_trait]
pub trait TokenRefresher: Send + Sync {
    /// 用凭证中的刷新令牌换取新的凭证集
    async fn refresh(&self, credentials: &CredentialSet) -> Result<CredentialSet, AuthError>;
}

/// Google OAuth 客户端
pub struct GoogleAuth {
    client: GoogleClient,
    http: Client,
    client_id: String,
    client_secret: String,
    token_uri: String,
    scopes: Vec<String>,
}

impl GoogleAuth {
    /// 根据配置创建 OAuth 客户端
    pub fn new(config: &AppConfig) -> Result<Self, AuthError> {
        let client = BasicClient::new(ClientId::new(config.client_id.clone()))
            .set_client_secret(ClientSecret::new(config.client_secret.clone()))
            .set_auth_uri(
                AuthUrl::new(config.auth_uri.clone())
                    .map_err(|e| AuthError::Config(format!("auth_uri: {}", e)))?,
            )
            .set_token_uri(
                TokenUrl::new(config.token_uri.clone())
                    .map_err(|e| AuthError::Config(format!("token_uri: {}", e)))?,
            )
            .set_redirect_uri(
                RedirectUrl::new(config.redirect_uri.clone())
                    .map_err(|e| AuthError::Config(format!("redirect_uri: {}", e)))?,
            )
            .set_auth_type(AuthType::RequestBody);

        Ok(Self {
            client,
            http: oauth_http_client()?,
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            token_uri: config.token_uri.clone(),
            scopes: vec![FORMS_BODY_SCOPE.to_string()],
        })
    }

    /// 生成授权 URL 和防伪 state
    ///
    /// 请求离线访问并强制显示同意页，确保每次都能拿到刷新令牌。
    pub fn authorize_url(&self) -> (String, CsrfToken) {
        let mut request = self.client.authorize_url(CsrfToken::new_random);
        for scope in &self.scopes {
            request = request.add_scope(Scope::new(scope.clone()));
        }
        let (url, state) = request
            .add_extra_param("access_type", "offline")
            .add_extra_param("prompt", "consent")
            .url();
        (url.to_string(), state)
    }

    /// 用授权码换取凭证集
    pub async fn exchange_code(&self, code: &str) -> Result<CredentialSet, AuthError> {
        let response = self
            .client
            .exchange_code(AuthorizationCode::new(code.to_string()))
            .request_async(&self.http)
            .await
            .map_err(|e| AuthError::TokenExchange(e.to_string()))?;

        let credentials = CredentialSet {
            token: response.access_token().secret().clone(),
            refresh_token: response.refresh_token().map(|t| t.secret().clone()),
            token_uri: self.token_uri.clone(),
            client_id: self.client_id.clone(),
            client_secret: self.client_secret.clone(),
            scopes: granted_scopes(&response).unwrap_or_else(|| self.scopes.clone()),
            expiry: expiry_of(&response, Utc::now()),
        };

        info!(
            "OAuth code exchanged: refresh_token={}, scopes={:?}",
            credentials.refresh_token.is_some(),
            credentials.scopes
        );
        Ok(credentials)
    }
}

#[async_trait]
impl TokenRefresher for GoogleAuth {
    async fn refresh(&self, credentials: &CredentialSet) -> Result<CredentialSet, AuthError> {
        let refresh_token = credentials
            .refresh_token
            .clone()
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::NoRefreshToken)?;

        // 使用凭证自身记录的端点和客户端信息
        let client = BasicClient::new(ClientId::new(credentials.client_id.clone()))
            .set_client_secret(ClientSecret::new(credentials.client_secret.clone()))
            .set_token_uri(
                TokenUrl::new(credentials.token_uri.clone())
                    .map_err(|e| AuthError::Config(format!("token_uri: {}", e)))?,
            )
            .set_auth_type(AuthType::RequestBody);

        let refresh_token = RefreshToken::new(refresh_token);
        let response = client
            .exchange_refresh_token(&refresh_token)
            .request_async(&self.http)
            .await
            .map_err(|e| AuthError::TokenExchange(e.to_string()))?;

        debug!("Access token refreshed: client_id={}", credentials.client_id);

        Ok(CredentialSet {
            token: response.access_token().secret().clone(),
            // 响应中没有新的刷新令牌时沿用旧值
            refresh_token: response
                .refresh_token()
                .map(|t| t.secret().clone())
                .or_else(|| credentials.refresh_token.clone()),
            scopes: granted_scopes(&response).unwrap_or_else(|| credentials.scopes.clone()),
            expiry: expiry_of(&response, Utc::now()),
            ..credentials.clone()
        })
    }
}

/// OAuth 专用 HTTP 客户端，不跟随重定向
fn oauth_http_client() -> Result<Client, AuthError> {
    Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .map_err(|e| AuthError::Config(format!("HTTP client: {}", e)))
}

fn granted_scopes(response: &BasicTokenResponse) -> Option<Vec<String>> {
    response
        .scopes()
        .map(|scopes| scopes.iter().map(|s| s.as_str().to_string()).collect())
}

fn expiry_of(response: &BasicTokenResponse, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    response
        .expires_in()
        .and_then(|d| chrono::Duration::from_std(d).ok())
        .map(|d| now + d)
}
