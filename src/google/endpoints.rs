//! Google 端点常量和 URL 构建工具

/// 授权端点
pub const GOOGLE_AUTH_URI: &str = "https://accounts.google.com/o/oauth2/auth";

/// 令牌端点
pub const GOOGLE_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Forms API 基础 URL
pub const FORMS_API_BASE: &str = "https://forms.googleapis.com";

/// 创建表单所需的权限范围
pub const FORMS_BODY_SCOPE: &str = "https://www.googleapis.com/auth/forms.body";

/// 构建 `forms.create` 端点
///
/// 允许 `FORMS_API_BASE` 写成主机、`/v1` 或完整的 `/v1/forms`，
/// 多余的斜杠会被去掉。
pub fn build_create_endpoint(base_url: &str) -> String {
    let (scheme, rest) = base_url
        .split_once("://")
        .unwrap_or(("https", base_url));
    let path = rest
        .split('/')
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join("/");
    let url = format!("{}://{}", scheme, path);

    if url.ends_with("/v1/forms") {
        url
    } else if url.ends_with("/v1") {
        format!("{}/forms", url)
    } else {
        format!("{}/v1/forms", url)
    }
}

/// 构建 `forms.batchUpdate` 端点
pub fn build_batch_update_endpoint(base_url: &str, form_id: &str) -> String {
    format!("{}/{}:batchUpdate", build_create_endpoint(base_url), form_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_create_endpoint() {
        assert_eq!(
            build_create_endpoint("https://forms.googleapis.com"),
            "https://forms.googleapis.com/v1/forms"
        );
        assert_eq!(
            build_create_endpoint("https://forms.googleapis.com/v1/"),
            "https://forms.googleapis.com/v1/forms"
        );
        assert_eq!(
            build_create_endpoint("http://127.0.0.1:9000/v1/forms"),
            "http://127.0.0.1:9000/v1/forms"
        );
        assert_eq!(
            build_create_endpoint("https://forms.googleapis.com//v1//"),
            "https://forms.googleapis.com/v1/forms"
        );
        assert_eq!(
            build_create_endpoint("forms.googleapis.com"),
            "https://forms.googleapis.com/v1/forms"
        );
    }

    #[test]
    fn test_build_batch_update_endpoint() {
        assert_eq!(
            build_batch_update_endpoint(FORMS_API_BASE, "1FAIpQL"),
            "https://forms.googleapis.com/v1/forms/1FAIpQL:batchUpdate"
        );
    }
}
