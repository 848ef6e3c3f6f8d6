use axum::http::HeaderMap;

/// 调用方身份通过该请求头带外传递。
pub const USER_HEADER: &str = "User";

/// 读取调用方名称；缺失或不是合法 UTF-8 时视为匿名。
pub fn caller_identity(headers: &HeaderMap) -> Option<String> {
    headers
        .get(USER_HEADER)
        .and_then(|header| header.to_str().ok())
        .map(str::to_owned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn reads_user_header_case_insensitively() {
        let mut headers = HeaderMap::new();
        headers.insert("user", HeaderValue::from_static("alice"));
        assert_eq!(caller_identity(&headers).as_deref(), Some("alice"));
    }

    #[test]
    fn missing_or_opaque_header_is_anonymous() {
        let mut headers = HeaderMap::new();
        assert_eq!(caller_identity(&headers), None);

        headers.insert("user", HeaderValue::from_bytes(b"\xff\xfe").unwrap());
        assert_eq!(caller_identity(&headers), None);
    }
}
