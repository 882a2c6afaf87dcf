//! Google Forms API 客户端

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, error, info};

use super::endpoints::{build_batch_update_endpoint, build_create_endpoint};
use super::types::{mask_token, FormsError};
use crate::services::translator::{BatchUpdatePayload, CreatedForm, FormCreationPayload};

/// Forms API 抽象
#[async_trait]
pub trait FormsApi: Send + Sync {
    /// 创建只带标题的新表单
    async fn create_form(
        &self,
        access_token: &str,
        payload: &FormCreationPayload,
    ) -> Result<CreatedForm, FormsError>;

    /// 对表单执行批量更新
    async fn batch_update(
        &self,
        access_token: &str,
        form_id: &str,
        payload: &BatchUpdatePayload,
    ) -> Result<(), FormsError>;
}

/// 基于 reqwest 的 Forms API 客户端
pub struct GoogleFormsClient {
    client: Client,
    base_url: String,
}

impl GoogleFormsClient {
    /// 创建新的客户端
    pub fn new(base_url: impl Into<String>) -> Result<Self, FormsError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(30))
            .pool_max_idle_per_host(5)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    async fn post_json<T: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        access_token: &str,
        body: &T,
    ) -> Result<Response, FormsError> {
        debug!(
            "Forms API request: endpoint={}, token={}",
            endpoint,
            mask_token(access_token)
        );

        let response = self
            .client
            .post(endpoint)
            .bearer_auth(access_token)
            .json(body)
            .send()
            .await?;

        // 检查状态码
        let status = response.status();
        if !status.is_success() {
            let status_code = status.as_u16();
            let error_text = response.text().await.unwrap_or_default();
            error!(
                "Forms API error: status={}, body={}",
                status_code,
                truncate(&error_text, 500)
            );
            return Err(FormsError::ApiError {
                status: status_code,
                message: api_error_message(&error_text),
            });
        }

        Ok(response)
    }
}

#[async_trait]
impl FormsApi for GoogleFormsClient {
    async fn create_form(
        &self,
        access_token: &str,
        payload: &FormCreationPayload,
    ) -> Result<CreatedForm, FormsError> {
        let endpoint = build_create_endpoint(&self.base_url);
        let response = self.post_json(&endpoint, access_token, payload).await?;
        let body = response.bytes().await?;
        let form: CreatedForm = serde_json::from_slice(&body)?;
        info!("Form created: form_id={}", form.form_id);
        Ok(form)
    }

    async fn batch_update(
        &self,
        access_token: &str,
        form_id: &str,
        payload: &BatchUpdatePayload,
    ) -> Result<(), FormsError> {
        let endpoint = build_batch_update_endpoint(&self.base_url, form_id);
        self.post_json(&endpoint, access_token, payload).await?;
        info!(
            "Form updated: form_id={}, requests={}",
            form_id,
            payload.requests.len()
        );
        Ok(())
    }
}

/// 从 Google 错误响应中提取可读信息
///
/// Google 错误体形如 `{"error": {"code": 400, "message": "...", "status": "..."}}`，
/// 无法解析时原样返回。
fn api_error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .and_then(|e| e.get("message"))
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.to_string())
}

fn truncate(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_message() {
        let body = r#"{"error": {"code": 400, "message": "Invalid value at 'requests[0]'", "status": "INVALID_ARGUMENT"}}"#;
        assert_eq!(api_error_message(body), "Invalid value at 'requests[0]'");
        assert_eq!(api_error_message("Bad Gateway"), "Bad Gateway");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("abc", 5), "abc");
        assert_eq!(truncate("abcdef", 3), "abc...");
        assert_eq!(truncate("가나다라", 2), "가나...");
    }
}
