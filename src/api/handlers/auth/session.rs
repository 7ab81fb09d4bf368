//! Token rotation and logout endpoints.

use anyhow::anyhow;
use axum::{
    Json,
    extract::Extension,
    http::{HeaderMap, StatusCode, header::SET_COOKIE},
};
use sqlx::PgPool;
use std::sync::Arc;

use crate::api::{error::ApiError, response::ApiResponse};

use super::cookie::{clear_refresh_cookie, refresh_cookie};
use super::principal::{refresh_subject, require_auth};
use super::service;
use super::state::AuthState;
use super::types::TokenData;
use super::utils::{extract_client_ip, log_security_event};

#[utoipa::path(
    post,
    path = "/v1/auth/refresh",
    responses(
        (status = 200, description = "New access token in body; rotated refresh token in cookie", body = ApiResponse<TokenData>),
        (status = 401, description = "Missing or invalid refresh cookie, or subject no longer active"),
    ),
    tag = "auth"
)]
pub async fn refresh(
    headers: HeaderMap,
    pool: Extension<PgPool>,
    auth_state: Extension<Arc<AuthState>>,
) -> Result<(StatusCode, HeaderMap, Json<ApiResponse<TokenData>>), ApiError> {
    let user_id = refresh_subject(&headers, &auth_state)?;

    // Rotation: the superseded refresh token is not revoked, only replaced;
    // the client is expected to discard it.
    let Some(tokens) = service::rotate(&pool, &auth_state, user_id).await? else {
        return Err(ApiError::Unauthenticated);
    };

    let cookie = refresh_cookie(auth_state.config(), &tokens.refresh)
        .map_err(|err| ApiError::Internal(anyhow!("invalid cookie value: {err}")))?;
    let mut response_headers = HeaderMap::new();
    response_headers.insert(SET_COOKIE, cookie);

    Ok((
        StatusCode::OK,
        response_headers,
        Json(ApiResponse::ok(TokenData::bearer(tokens.access))),
    ))
}

#[utoipa::path(
    post,
    path = "/v1/auth/logout",
    responses(
        (status = 200, description = "Refresh cookie cleared; the access token stays valid until natural expiry"),
        (status = 401, description = "Missing or invalid access token"),
    ),
    tag = "auth"
)]
pub async fn logout(
    headers: HeaderMap,
    pool: Extension<PgPool>,
    auth_state: Extension<Arc<AuthState>>,
) -> Result<(StatusCode, HeaderMap, Json<ApiResponse<()>>), ApiError> {
    let principal = require_auth(&headers, &pool, &auth_state).await?;

    let ip = extract_client_ip(&headers);
    log_security_event("logout", Some(principal.user.id), ip.as_deref(), true);

    // Clearing the cookie is the whole logout; nothing is revoked server-side.
    let cookie = clear_refresh_cookie(auth_state.config())
        .map_err(|err| ApiError::Internal(anyhow!("invalid cookie value: {err}")))?;
    let mut response_headers = HeaderMap::new();
    response_headers.insert(SET_COOKIE, cookie);

    Ok((
        StatusCode::OK,
        response_headers,
        Json(ApiResponse::empty()),
    ))
}
