use reqwest::header::{
    HeaderMap, HeaderName, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, COOKIE, REFERER, USER_AGENT,
};

/// Build browser-like headers for page requests
///
/// Invalid header values (e.g. a user agent with control characters) are
/// skipped rather than failing the request.
///
/// # Examples
///
/// ```
/// use v2ex_explore::crawler::headers::build_page_headers;
///
/// let headers = build_page_headers("Mozilla/5.0", Some("https://www.v2ex.com/"));
/// assert!(headers.contains_key("referer"));
/// ```
pub fn build_page_headers(user_agent: &str, referer: Option<&str>) -> HeaderMap {
    let mut headers = HeaderMap::new();

    if let Ok(value) = HeaderValue::from_str(user_agent) {
        headers.insert(USER_AGENT, value);
    }
    if let Some(value) = referer.and_then(|r| HeaderValue::from_str(r).ok()) {
        headers.insert(REFERER, value);
    }
    headers.insert(
        ACCEPT,
        HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
        ),
    );
    headers.insert(
        ACCEPT_LANGUAGE,
        HeaderValue::from_static("zh-CN,zh;q=0.9,en-US;q=0.8,en;q=0.7"),
    );

    headers.insert(
        HeaderName::from_static("sec-fetch-dest"),
        HeaderValue::from_static("document"),
    );
    headers.insert(
        HeaderName::from_static("sec-fetch-mode"),
        HeaderValue::from_static("navigate"),
    );
    headers.insert(
        HeaderName::from_static("upgrade-insecure-requests"),
        HeaderValue::from_static("1"),
    );

    headers
}

/// Attach the session credential as the `Cookie` header
///
/// Returns `false` when the credential is not a valid header value; the
/// request then goes out anonymously.
pub fn attach_credential(headers: &mut HeaderMap, credential: &str) -> bool {
    match HeaderValue::from_str(credential) {
        Ok(mut value) => {
            value.set_sensitive(true);
            headers.insert(COOKIE, value);
            true
        }
        Err(_) => false,
    }
}
