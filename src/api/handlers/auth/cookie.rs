//! Refresh token cookie handling and header extraction.
//!
//! The refresh token travels only in an `HttpOnly` cookie scoped to the auth
//! path prefix; it is never accepted from a header or returned in a body.

use axum::http::{
    HeaderMap, HeaderValue,
    header::{AUTHORIZATION, COOKIE, InvalidHeaderValue},
};

use super::state::AuthConfig;

pub(crate) const REFRESH_COOKIE_NAME: &str = "refresh_token";
const AUTH_COOKIE_PATH: &str = "/v1/auth";

/// Build the `Set-Cookie` value carrying a freshly issued refresh token.
pub(super) fn refresh_cookie(
    config: &AuthConfig,
    token: &str,
) -> Result<HeaderValue, InvalidHeaderValue> {
    let max_age = config.refresh_token_ttl_seconds();
    let mut cookie = format!(
        "{REFRESH_COOKIE_NAME}={token}; Path={AUTH_COOKIE_PATH}; HttpOnly; SameSite=Strict; Max-Age={max_age}"
    );
    if config.cookie_secure() {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

/// Build the `Set-Cookie` value that clears the refresh cookie on logout.
pub(super) fn clear_refresh_cookie(config: &AuthConfig) -> Result<HeaderValue, InvalidHeaderValue> {
    let mut cookie = format!(
        "{REFRESH_COOKIE_NAME}=; Path={AUTH_COOKIE_PATH}; HttpOnly; SameSite=Strict; Max-Age=0"
    );
    if config.cookie_secure() {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

/// Read the refresh token from the request cookies, if present.
pub(super) fn extract_refresh_token(headers: &HeaderMap) -> Option<String> {
    let header = headers.get(COOKIE)?;
    let value = header.to_str().ok()?;
    for pair in value.split(';') {
        let trimmed = pair.trim();
        let mut parts = trimmed.splitn(2, '=');
        let key = parts.next()?.trim();
        let val = parts.next()?.trim();
        if key == REFRESH_COOKIE_NAME {
            return Some(val.to_string());
        }
    }
    None
}

/// Read the bearer access token from the `Authorization` header, if present.
pub(crate) fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let trimmed = value.trim();
    let token = trimmed
        .strip_prefix("Bearer ")
        .or_else(|| trimmed.strip_prefix("bearer "))?
        .trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}
