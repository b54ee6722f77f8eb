//! `access_token` cookie helpers
//!
//! 浏览器仪表盘使用 HttpOnly cookie，脚本客户端使用 Bearer 头。

use cookie::{Cookie, SameSite};
use http::HeaderMap;

pub const ACCESS_TOKEN_COOKIE: &str = "access_token";

/// 从 Cookie 头中读取 access_token
pub fn access_token_from_headers(headers: &HeaderMap) -> Option<String> {
    let header = headers
        .get(http::header::COOKIE)
        .and_then(|h| h.to_str().ok())?;

    header.split(';').find_map(|raw| {
        let cookie = Cookie::parse(raw.trim()).ok()?;
        (cookie.name() == ACCESS_TOKEN_COOKIE && !cookie.value().is_empty())
            .then(|| cookie.value().to_owned())
    })
}

/// 登录成功后下发的会话 cookie
pub fn access_token_cookie(token: &str, secure: bool) -> Cookie<'static> {
    let mut cookie = Cookie::new(ACCESS_TOKEN_COOKIE, token.to_owned());
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Lax);
    cookie.set_secure(secure);
    cookie.set_path("/");
    cookie
}

/// 登出时清除 cookie
pub fn removal_cookie(secure: bool) -> Cookie<'static> {
    let mut cookie = access_token_cookie("", secure);
    cookie.make_removal();
    cookie
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;

    #[test]
    fn test_read_token_among_other_cookies() {
        let mut headers = HeaderMap::new();
        headers.insert(
            http::header::COOKIE,
            HeaderValue::from_static("theme=dark; access_token=abc.def.ghi; lang=es"),
        );
        assert_eq!(
            access_token_from_headers(&headers).as_deref(),
            Some("abc.def.ghi")
        );
    }

    #[test]
    fn test_missing_or_empty_cookie() {
        let mut headers = HeaderMap::new();
        assert!(access_token_from_headers(&headers).is_none());
        headers.insert(
            http::header::COOKIE,
            HeaderValue::from_static("access_token="),
        );
        assert!(access_token_from_headers(&headers).is_none());
    }

    #[test]
    fn test_cookie_attributes() {
        let rendered = access_token_cookie("tok", true).to_string();
        assert!(rendered.starts_with("access_token=tok"));
        assert!(rendered.contains("HttpOnly"));
        assert!(rendered.contains("SameSite=Lax"));
        assert!(rendered.contains("Secure"));
        assert!(rendered.contains("Path=/"));

        let removal = removal_cookie(false).to_string();
        assert!(removal.contains("Max-Age=0"));
        assert!(!removal.contains("Secure"));
    }
}
