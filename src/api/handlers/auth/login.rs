//! Login endpoint.

use anyhow::anyhow;
use axum::{
    Json,
    extract::Extension,
    http::{HeaderMap, StatusCode, header::SET_COOKIE},
};
use sqlx::PgPool;
use std::sync::Arc;

use crate::api::{error::ApiError, response::ApiResponse};

use super::cookie::refresh_cookie;
use super::service;
use super::state::AuthState;
use super::types::{LoginRequest, TokenData};
use super::utils::{extract_client_ip, log_security_event, normalize_email};

#[utoipa::path(
    post,
    path = "/v1/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Authenticated; access token in body, refresh token in cookie", body = ApiResponse<TokenData>),
        (status = 401, description = "Invalid credentials (unknown email and wrong password are indistinguishable)"),
        (status = 422, description = "Missing payload"),
    ),
    tag = "auth"
)]
pub async fn login(
    headers: HeaderMap,
    pool: Extension<PgPool>,
    auth_state: Extension<Arc<AuthState>>,
    payload: Option<Json<LoginRequest>>,
) -> Result<(StatusCode, HeaderMap, Json<ApiResponse<TokenData>>), ApiError> {
    let Some(Json(payload)) = payload else {
        return Err(ApiError::Validation(
            "Missing or malformed JSON payload".to_string(),
        ));
    };

    let email = normalize_email(&payload.email);
    let ip = extract_client_ip(&headers);

    let Some((user, tokens)) =
        service::authenticate(&pool, &auth_state, &email, &payload.password).await?
    else {
        log_security_event("login", None, ip.as_deref(), false);
        return Err(ApiError::AuthenticationFailed);
    };

    log_security_event("login", Some(user.id), ip.as_deref(), true);

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
