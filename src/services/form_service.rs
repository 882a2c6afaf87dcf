//! 表单提交编排
//!
//! 依次完成：确保访问令牌有效 → 创建表单 → 批量添加题目。
//! 除访问令牌被拒绝时刷新重试一次外，任何失败都立即返回给调用方。

use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};

use crate::error::AppError;
use crate::google::{AuthError, CredentialSet, FormsApi, FormsError, TokenRefresher};
use crate::services::translator::{translate, QuestionnaireRequest};

/// 提交结果
#[derive(Debug, Clone)]
pub struct FormSubmission {
    pub form_id: String,
    /// 面向填写者的表单链接
    pub form_url: String,
}

/// 提交错误
#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    /// Forms API 返回了错误状态码
    #[error("{0}")]
    Upstream(String),

    /// 其他错误（网络、刷新失败、响应无法解析等）
    #[error("{0}")]
    Unexpected(String),
}

impl From<FormsError> for SubmitError {
    fn from(err: FormsError) -> Self {
        match err {
            FormsError::ApiError { .. } => SubmitError::Upstream(err.to_string()),
            FormsError::HttpError(_) | FormsError::JsonError(_) => {
                SubmitError::Unexpected(err.to_string())
            }
        }
    }
}

impl From<AuthError> for SubmitError {
    fn from(err: AuthError) -> Self {
        SubmitError::Unexpected(err.to_string())
    }
}

/// 令牌过期与其他异常无法区分，`Unexpected` 一律要求重新登录
impl From<SubmitError> for AppError {
    fn from(err: SubmitError) -> Self {
        match err {
            SubmitError::Upstream(msg) => AppError::Upstream(msg),
            SubmitError::Unexpected(msg) => AppError::Unexpected(msg),
        }
    }
}

/// 表单服务
#[derive(Clone)]
pub struct FormService {
    api: Arc<dyn FormsApi>,
    refresher: Arc<dyn TokenRefresher>,
}

impl FormService {
    pub fn new(api: Arc<dyn FormsApi>, refresher: Arc<dyn TokenRefresher>) -> Self {
        Self { api, refresher }
    }

    /// 用给定凭证创建表单
    ///
    /// 令牌刷新后会就地更新 `credentials`，无论提交成功与否。
    pub async fn submit(
        &self,
        credentials: &mut CredentialSet,
        survey: &QuestionnaireRequest,
    ) -> Result<FormSubmission, SubmitError> {
        let mut refreshed = self.ensure_fresh(credentials).await?;

        let (form_payload, batch_payload) = translate(survey);

        let created = self.api.create_form(&credentials.token, &form_payload).await;
        let form = match created {
            Err(FormsError::ApiError { status: 401, message }) => {
                // 令牌被吊销或 expiry 不可信：刷新一次后重试
                if refreshed || !credentials.can_refresh() {
                    warn!("Forms API rejected the access token: {}", message);
                    return Err(SubmitError::Unexpected(format!(
                        "access token rejected: {}",
                        message
                    )));
                }
                info!("Forms API rejected the access token, refreshing once");
                let fresh = self.refresher.refresh(credentials).await?;
                *credentials = fresh;
                refreshed = true;
                self.api
                    .create_form(&credentials.token, &form_payload)
                    .await
                    .map_err(reject_after_refresh)?
            }
            other => other?,
        };

        if !batch_payload.is_empty() {
            self.api
                .batch_update(&credentials.token, &form.form_id, &batch_payload)
                .await?;
        }

        info!(
            "Form submitted: form_id={}, items={}, dropped={}, token_refreshed={}",
            form.form_id,
            batch_payload.item_count(),
            survey.questions.len() - batch_payload.item_count(),
            refreshed
        );

        Ok(FormSubmission {
            form_id: form.form_id,
            form_url: form.responder_uri,
        })
    }

    /// 访问令牌过期且有刷新令牌时刷新，返回是否刷新过
    async fn ensure_fresh(&self, credentials: &mut CredentialSet) -> Result<bool, SubmitError> {
        if !credentials.is_expired(Utc::now()) {
            return Ok(false);
        }

        if !credentials.can_refresh() {
            warn!("Access token expired and no refresh token is stored");
            return Ok(false);
        }

        let fresh = self.refresher.refresh(credentials).await?;
        *credentials = fresh;
        Ok(true)
    }
}

/// 刷新后的令牌仍被拒绝时，只能重新登录
fn reject_after_refresh(err: FormsError) -> SubmitError {
    match err {
        FormsError::ApiError { status: 401, message } => {
            SubmitError::Unexpected(format!("access token rejected: {}", message))
        }
        other => other.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::translator::{
        BatchUpdatePayload, CreatedForm, FormCreationPayload, Question,
    };
    use async_trait::async_trait;
    use chrono::Duration;
    use std::sync::Mutex;

    /// 记录调用的 Forms API
    #[derive(Default)]
    struct RecordingApi {
        calls: Mutex<Vec<String>>,
        fail_create: Option<u16>,
        fail_batch: Option<u16>,
        fail_transport: bool,
        /// 这些访问令牌会被拒绝（401）
        revoked: Vec<&'static str>,
    }

    #[async_trait]
    impl FormsApi for RecordingApi {
        async fn create_form(
            &self,
            access_token: &str,
            payload: &FormCreationPayload,
        ) -> Result<CreatedForm, FormsError> {
            self.calls.lock().unwrap().push(format!(
                "create:{}:{}",
                access_token,
                payload.info.title.clone().unwrap_or_default()
            ));
            if self.revoked.iter().any(|t| *t == access_token) {
                return Err(FormsError::ApiError {
                    status: 401,
                    message: "Request had invalid authentication credentials.".to_string(),
                });
            }
            if let Some(status) = self.fail_create {
                return Err(FormsError::ApiError {
                    status,
                    message: "denied".to_string(),
                });
            }
            if self.fail_transport {
                let err = serde_json::from_str::<CreatedForm>("{").unwrap_err();
                return Err(FormsError::JsonError(err));
            }
            Ok(CreatedForm {
                form_id: "form-1".to_string(),
                responder_uri: "https://docs.google.com/forms/d/e/form-1/viewform".to_string(),
            })
        }

        async fn batch_update(
            &self,
            access_token: &str,
            form_id: &str,
            payload: &BatchUpdatePayload,
        ) -> Result<(), FormsError> {
            self.calls.lock().unwrap().push(format!(
                "batch:{}:{}:{}",
                access_token,
                form_id,
                payload.requests.len()
            ));
            if let Some(status) = self.fail_batch {
                return Err(FormsError::ApiError {
                    status,
                    message: "Invalid requests[0]".to_string(),
                });
            }
            Ok(())
        }
    }

    #[derive(Default)]
    struct StaticRefresher {
        fail: bool,
        calls: Mutex<usize>,
    }

    #[async_trait]
    impl TokenRefresher for StaticRefresher {
        async fn refresh(&self, credentials: &CredentialSet) -> Result<CredentialSet, AuthError> {
            *self.calls.lock().unwrap() += 1;
            if self.fail {
                return Err(AuthError::TokenExchange("invalid_grant".to_string()));
            }
            Ok(CredentialSet {
                token: "fresh-token".to_string(),
                expiry: Some(Utc::now() + Duration::hours(1)),
                ..credentials.clone()
            })
        }
    }

    fn credentials(expiry_offset: Option<Duration>) -> CredentialSet {
        CredentialSet {
            token: "old-token".to_string(),
            refresh_token: Some("refresh".to_string()),
            token_uri: "https://oauth2.googleapis.com/token".to_string(),
            client_id: "client".to_string(),
            client_secret: "secret".to_string(),
            scopes: vec![],
            expiry: expiry_offset.map(|d| Utc::now() + d),
        }
    }

    fn survey(description: &str, questions: usize) -> QuestionnaireRequest {
        QuestionnaireRequest {
            survey_title: "Quiz".to_string(),
            survey_description: description.to_string(),
            questions: (0..questions)
                .map(|i| Question {
                    question_text: Some(format!("Q{}", i)),
                    ..Default::default()
                })
                .collect(),
        }
    }

    fn service(api: Arc<RecordingApi>, refresher: Arc<StaticRefresher>) -> FormService {
        FormService::new(api, refresher)
    }

    fn refresher(fail: bool) -> Arc<StaticRefresher> {
        Arc::new(StaticRefresher {
            fail,
            ..Default::default()
        })
    }

    #[tokio::test]
    async fn test_submit_creates_then_updates() {
        let api = Arc::new(RecordingApi::default());
        let mut creds = credentials(None);
        let submission = service(api.clone(), refresher(false))
            .submit(&mut creds, &survey("desc", 2))
            .await
            .unwrap();

        assert_eq!(submission.form_id, "form-1");
        assert_eq!(
            submission.form_url,
            "https://docs.google.com/forms/d/e/form-1/viewform"
        );
        assert_eq!(creds.token, "old-token");
        assert_eq!(
            *api.calls.lock().unwrap(),
            vec!["create:old-token:Quiz", "batch:old-token:form-1:3"]
        );
    }

    #[tokio::test]
    async fn test_empty_batch_is_skipped() {
        let api = Arc::new(RecordingApi::default());
        service(api.clone(), refresher(false))
            .submit(&mut credentials(None), &survey("", 0))
            .await
            .unwrap();
        assert_eq!(*api.calls.lock().unwrap(), vec!["create:old-token:Quiz"]);
    }

    #[tokio::test]
    async fn test_expired_token_is_refreshed() {
        let api = Arc::new(RecordingApi::default());
        let mut creds = credentials(Some(-Duration::minutes(5)));
        service(api.clone(), refresher(false))
            .submit(&mut creds, &survey("", 1))
            .await
            .unwrap();

        assert_eq!(creds.token, "fresh-token");
        assert_eq!(creds.refresh_token.as_deref(), Some("refresh"));
        assert_eq!(
            *api.calls.lock().unwrap(),
            vec!["create:fresh-token:Quiz", "batch:fresh-token:form-1:1"]
        );
    }

    #[tokio::test]
    async fn test_valid_token_is_not_refreshed() {
        let api = Arc::new(RecordingApi::default());
        let mut creds = credentials(Some(Duration::hours(1)));
        service(api, refresher(true))
            .submit(&mut creds, &survey("", 1))
            .await
            .unwrap();
        assert_eq!(creds.token, "old-token");
    }

    #[tokio::test]
    async fn test_refresh_failure_invalidates_credentials() {
        let api = Arc::new(RecordingApi::default());
        let err = service(api.clone(), refresher(true))
            .submit(&mut credentials(Some(-Duration::minutes(5))), &survey("", 1))
            .await
            .unwrap_err();

        assert!(AppError::from(err).invalidates_credentials());
        assert!(api.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_revoked_token_is_refreshed_and_retried() {
        let api = Arc::new(RecordingApi {
            revoked: vec!["old-token"],
            ..Default::default()
        });
        let refresher = refresher(false);
        let mut creds = credentials(Some(Duration::hours(1)));
        let submission = service(api.clone(), refresher.clone())
            .submit(&mut creds, &survey("", 1))
            .await
            .unwrap();

        assert_eq!(submission.form_id, "form-1");
        assert_eq!(creds.token, "fresh-token");
        assert_eq!(*refresher.calls.lock().unwrap(), 1);
        assert_eq!(
            *api.calls.lock().unwrap(),
            vec![
                "create:old-token:Quiz",
                "create:fresh-token:Quiz",
                "batch:fresh-token:form-1:1"
            ]
        );
    }

    #[tokio::test]
    async fn test_revoked_token_without_refresh_token_invalidates() {
        let api = Arc::new(RecordingApi {
            revoked: vec!["old-token"],
            ..Default::default()
        });
        let refresher = refresher(false);
        let mut creds = CredentialSet {
            refresh_token: None,
            ..credentials(None)
        };
        let err = service(api, refresher.clone())
            .submit(&mut creds, &survey("", 1))
            .await
            .unwrap_err();

        assert!(matches!(err, SubmitError::Unexpected(_)));
        assert!(AppError::from(err).invalidates_credentials());
        assert_eq!(*refresher.calls.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_revoked_token_with_failing_refresh_invalidates() {
        let api = Arc::new(RecordingApi {
            revoked: vec!["old-token"],
            ..Default::default()
        });
        let err = service(api.clone(), refresher(true))
            .submit(&mut credentials(None), &survey("", 1))
            .await
            .unwrap_err();

        assert!(AppError::from(err).invalidates_credentials());
        assert_eq!(*api.calls.lock().unwrap(), vec!["create:old-token:Quiz"]);
    }

    #[tokio::test]
    async fn test_refreshed_token_rejected_again_invalidates() {
        let api = Arc::new(RecordingApi {
            revoked: vec!["old-token", "fresh-token"],
            ..Default::default()
        });
        let refresher = refresher(false);
        let err = service(api.clone(), refresher.clone())
            .submit(&mut credentials(None), &survey("", 1))
            .await
            .unwrap_err();

        assert!(matches!(err, SubmitError::Unexpected(_)));
        assert_eq!(*refresher.calls.lock().unwrap(), 1);
        assert_eq!(api.calls.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_upstream_failure_keeps_refreshed_credentials() {
        let api = Arc::new(RecordingApi {
            fail_batch: Some(400),
            ..Default::default()
        });
        let mut creds = credentials(Some(-Duration::minutes(5)));
        let err = service(api, refresher(false))
            .submit(&mut creds, &survey("", 1))
            .await
            .unwrap_err();

        assert!(matches!(err, SubmitError::Upstream(_)));
        assert_eq!(creds.token, "fresh-token");
    }

    #[tokio::test]
    async fn test_api_rejection_is_upstream() {
        let api = Arc::new(RecordingApi {
            fail_create: Some(403),
            ..Default::default()
        });
        let err = service(api, refresher(false))
            .submit(&mut credentials(None), &survey("", 1))
            .await
            .unwrap_err();

        assert!(matches!(err, SubmitError::Upstream(_)));
        let err = AppError::from(err);
        assert!(!err.invalidates_credentials());
        assert!(matches!(err, AppError::Upstream(_)));
    }

    #[tokio::test]
    async fn test_decode_failure_is_unexpected() {
        let api = Arc::new(RecordingApi {
            fail_transport: true,
            ..Default::default()
        });
        let err = service(api, refresher(false))
            .submit(&mut credentials(None), &survey("", 1))
            .await
            .unwrap_err();

        let err = AppError::from(err);
        assert!(err.invalidates_credentials());
        assert!(matches!(err, AppError::Unexpected(_)));
    }
}
