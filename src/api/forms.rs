//! 表单创建端点

use axum::{
    body::Bytes,
    extract::State,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use axum_extra::extract::cookie::PrivateCookieJar;
use tracing::{error, info, warn};

use crate::error::AppError;
use crate::google::CredentialSet;
use crate::models::CreateFormResponse;
use crate::services::translator::QuestionnaireRequest;
use crate::state::AppState;

/// 根据问卷 JSON 创建 Google 表单
async fn create_form(State(state): State<AppState>, jar: PrivateCookieJar, body: Bytes) -> Response {
    let Some(mut credentials) = state.session.load_credentials(&jar) else {
        return AppError::NotAuthenticated.into_response();
    };
    let issued_token = credentials.token.clone();

    let survey = match QuestionnaireRequest::from_slice(&body) {
        Ok(survey) => survey,
        Err(e) => {
            warn!("Rejected questionnaire body: {}", e);
            return AppError::BadRequest(e.to_string()).into_response();
        }
    };

    info!(
        "Creating form: title={:?}, questions={}",
        survey.resolved_title(),
        survey.questions.len()
    );

    let result = state.forms.submit(&mut credentials, &survey).await;

    let err = match result {
        Ok(submission) => {
            info!("Form ready: form_id={}", submission.form_id);
            let body = Json(CreateFormResponse {
                message: "Form created successfully!".to_string(),
                form_url: submission.form_url,
            });
            return match write_back(&state, jar, &credentials, &issued_token) {
                Ok(jar) => (jar, body).into_response(),
                Err(e) => e.into_response(),
            };
        }
        Err(err) => AppError::from(err),
    };

    error!("Form creation failed: {}", err);
    if err.invalidates_credentials() {
        return (state.session.clear_credentials(jar), err).into_response();
    }
    // 上游拒绝时保留已刷新的凭证
    match write_back(&state, jar, &credentials, &issued_token) {
        Ok(jar) => (jar, err).into_response(),
        Err(e) => e.into_response(),
    }
}

/// 令牌在本次请求中被刷新时写回会话
fn write_back(
    state: &AppState,
    jar: PrivateCookieJar,
    credentials: &CredentialSet,
    issued_token: &str,
) -> Result<PrivateCookieJar, AppError> {
    if credentials.token == issued_token {
        return Ok(jar);
    }
    info!("Storing refreshed credentials");
    state.session.store_credentials(jar, credentials)
}

/// 创建表单路由
pub fn forms_routes() -> Router<AppState> {
    Router::new().route("/api/create-form", post(create_form))
}
