//! Google 接入模块
//!
//! OAuth2 授权流程与 Forms API 客户端。

mod endpoints;
mod forms_client;
mod oauth;
mod types;

pub use endpoints::{FORMS_API_BASE, GOOGLE_AUTH_URI, GOOGLE_TOKEN_URI};
pub use forms_client::{FormsApi, GoogleFormsClient};
pub use oauth::{GoogleAuth, TokenRefresher};
pub use types::{AuthError, CredentialSet, FormsError};
