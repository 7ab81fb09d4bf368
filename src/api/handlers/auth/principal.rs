//! Authenticated principal extraction: the per-request authorization gate.
//!
//! Flow Overview: read the bearer access token, verify it, and resolve the
//! subject to an active user before any handler logic runs. Refresh tokens
//! are only ever read from the dedicated cookie, never a header.

use axum::http::HeaderMap;
use sqlx::PgPool;
use uuid::Uuid;

use crate::api::error::ApiError;

use super::cookie::{extract_bearer_token, extract_refresh_token};
use super::state::AuthState;
use super::storage::{UserRecord, lookup_active_user};
use super::token::TokenKind;

/// Authenticated user context derived from the access token.
#[derive(Debug, Clone)]
pub(crate) struct Principal {
    pub(crate) user: UserRecord,
}

/// Resolve the bearer access token into a principal.
///
/// Missing, malformed, expired, and wrong-type tokens, as well as deleted or
/// unknown subjects, all collapse into the same `Unauthenticated` error.
///
/// # Errors
/// `ApiError::Unauthenticated` on any token or subject miss; `ApiError::Internal`
/// on storage failures.
pub(crate) async fn require_auth(
    headers: &HeaderMap,
    pool: &PgPool,
    state: &AuthState,
) -> Result<Principal, ApiError> {
    let Some(token) = extract_bearer_token(headers) else {
        return Err(ApiError::Unauthenticated);
    };

    let verified = state
        .tokens()
        .verify(&token, TokenKind::Access)
        .map_err(|_| ApiError::Unauthenticated)?;

    let Some(user) = lookup_active_user(pool, verified.user_id).await? else {
        return Err(ApiError::Unauthenticated);
    };

    Ok(Principal { user })
}

/// Resolve the refresh cookie into a user id for rotation.
///
/// # Errors
/// `ApiError::Unauthenticated` when the cookie is absent or its token fails
/// verification in any way.
pub(super) fn refresh_subject(headers: &HeaderMap, state: &AuthState) -> Result<Uuid, ApiError> {
    let Some(token) = extract_refresh_token(headers) else {
        return Err(ApiError::Unauthenticated);
    };

    let verified = state
        .tokens()
        .verify(&token, TokenKind::Refresh)
        .map_err(|_| ApiError::Unauthenticated)?;

    Ok(verified.user_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::handlers::auth::state::AuthConfig;
    use axum::http::{HeaderValue, header::COOKIE};
    use secrecy::SecretString;

    fn state() -> AuthState {
        AuthState::new(AuthConfig::new(SecretString::from("secret")))
    }

    #[test]
    fn refresh_subject_requires_cookie() {
        let headers = HeaderMap::new();
        assert!(matches!(
            refresh_subject(&headers, &state()),
            Err(ApiError::Unauthenticated)
        ));
    }

    #[test]
    fn refresh_subject_rejects_access_token_in_cookie() {
        let state = state();
        let user_id = Uuid::new_v4();
        let access = state.tokens().issue_access(user_id).expect("issue");

        let mut headers = HeaderMap::new();
        let cookie = format!("refresh_token={access}");
        headers.insert(COOKIE, HeaderValue::from_str(&cookie).expect("ascii"));

        assert!(matches!(
            refresh_subject(&headers, &state),
            Err(ApiError::Unauthenticated)
        ));
    }

    #[test]
    fn refresh_subject_accepts_refresh_cookie() {
        let state = state();
        let user_id = Uuid::new_v4();
        let refresh = state.tokens().issue_refresh(user_id).expect("issue");

        let mut headers = HeaderMap::new();
        let cookie = format!("refresh_token={refresh}");
        headers.insert(COOKIE, HeaderValue::from_str(&cookie).expect("ascii"));

        assert_eq!(refresh_subject(&headers, &state).expect("subject"), user_id);
    }
}
