//! Small helpers for auth validation and request metadata.

use regex::Regex;
use tracing::{info, warn};
use uuid::Uuid;

/// Normalize an email for lookup/uniqueness checks.
pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Basic email format check on already-normalized input.
pub(super) fn valid_email(email_normalized: &str) -> bool {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").is_ok_and(|regex| regex.is_match(email_normalized))
}

/// Usernames are 3-30 word characters; the same charset is enforced by the
/// database column check.
pub(crate) fn valid_username(username: &str) -> bool {
    Regex::new(r"^[A-Za-z0-9_]{3,30}$").is_ok_and(|regex| regex.is_match(username))
}

/// Minimum password length; strength policy beyond length is out of scope.
pub(super) fn valid_password(password: &str) -> bool {
    password.chars().count() >= 8
}

pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().is_some_and(|code| code.as_ref() == "23505"),
        _ => false,
    }
}

/// Extract a client IP for security logging from common proxy headers.
pub(crate) fn extract_client_ip(headers: &axum::http::HeaderMap) -> Option<String> {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|value| !value.is_empty());
    if forwarded.is_some() {
        return forwarded.map(str::to_string);
    }
    headers
        .get("x-real-ip")
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

/// Record a security-relevant event (signup, login, logout).
///
/// Only event type, subject id, and source address are logged; credentials
/// and token contents never are.
pub(super) fn log_security_event(
    event_type: &str,
    user_id: Option<Uuid>,
    ip_address: Option<&str>,
    success: bool,
) {
    let user_id = user_id.map(|id| id.to_string());
    let ip_address = ip_address.unwrap_or("unknown");
    if success {
        info!(
            event_type,
            user_id = user_id.as_deref(),
            ip_address,
            success,
            "security event"
        );
    } else {
        warn!(
            event_type,
            user_id = user_id.as_deref(),
            ip_address,
            success,
            "security event"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderMap, HeaderValue};

    #[test]
    fn normalize_email_trims_and_lowercases() {
        assert_eq!(normalize_email(" Alice@Example.COM "), "alice@example.com");
    }

    #[test]
    fn valid_email_accepts_basic_format() {
        assert!(valid_email("a@example.com"));
        assert!(valid_email("name.surname@example.co"));
    }

    #[test]
    fn valid_email_rejects_missing_parts() {
        assert!(!valid_email("not-an-email"));
        assert!(!valid_email("missing-at.example.com"));
        assert!(!valid_email("missing-domain@"));
    }

    #[test]
    fn valid_username_enforces_length_and_charset() {
        assert!(valid_username("alice"));
        assert!(valid_username("alice_42"));
        assert!(!valid_username("al"));
        assert!(!valid_username("a".repeat(31).as_str()));
        assert!(!valid_username("alice!"));
        assert!(!valid_username("alice smith"));
    }

    #[test]
    fn valid_password_requires_eight_chars() {
        assert!(valid_password("pw123456"));
        assert!(!valid_password("pw12345"));
    }

    #[test]
    fn extract_client_ip_prefers_forwarded() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("1.2.3.4, 5.6.7.8"),
        );
        headers.insert("x-real-ip", HeaderValue::from_static("9.9.9.9"));
        assert_eq!(extract_client_ip(&headers), Some("1.2.3.4".to_string()));
    }

    #[test]
    fn extract_client_ip_falls_back_to_real_ip() {
        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", HeaderValue::from_static("9.9.9.9"));
        assert_eq!(extract_client_ip(&headers), Some("9.9.9.9".to_string()));
    }

    #[test]
    fn extract_client_ip_none_when_missing() {
        let headers = HeaderMap::new();
        assert_eq!(extract_client_ip(&headers), None);
    }
}
