//! Account registration endpoint.

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
use super::service::{self, RegisterOutcome};
use super::state::AuthState;
use super::types::{SignupRequest, TokenData};
use super::utils::{
    extract_client_ip, log_security_event, normalize_email, valid_email, valid_password,
    valid_username,
};

#[utoipa::path(
    post,
    path = "/v1/auth/signup",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "Account created; access token in body, refresh token in cookie", body = ApiResponse<TokenData>),
        (status = 409, description = "Email or username already taken"),
        (status = 422, description = "Invalid email, username, or password"),
    ),
    tag = "auth"
)]
pub async fn signup(
    headers: HeaderMap,
    pool: Extension<PgPool>,
    auth_state: Extension<Arc<AuthState>>,
    payload: Option<Json<SignupRequest>>,
) -> Result<(StatusCode, HeaderMap, Json<ApiResponse<TokenData>>), ApiError> {
    let Some(Json(payload)) = payload else {
        return Err(ApiError::Validation(
            "Missing or malformed JSON payload".to_string(),
        ));
    };

    let email = normalize_email(&payload.email);
    if !valid_email(&email) {
        return Err(ApiError::Validation("Invalid email address".to_string()));
    }
    if !valid_username(&payload.username) {
        return Err(ApiError::Validation(
            "Username must be 3-30 characters of letters, digits, or underscore".to_string(),
        ));
    }
    if !valid_password(&payload.password) {
        return Err(ApiError::Validation(
            "Password must be at least 8 characters".to_string(),
        ));
    }

    let outcome =
        service::register(&pool, &auth_state, &email, &payload.username, &payload.password)
            .await?;

    match outcome {
        RegisterOutcome::Conflict(message) => Err(ApiError::Conflict(message)),
        RegisterOutcome::Created { user, tokens } => {
            let ip = extract_client_ip(&headers);
            log_security_event("signup", Some(user.id), ip.as_deref(), true);

            let cookie = refresh_cookie(auth_state.config(), &tokens.refresh)
                .map_err(|err| ApiError::Internal(anyhow!("invalid cookie value: {err}")))?;
            let mut response_headers = HeaderMap::new();
            response_headers.insert(SET_COOKIE, cookie);

            Ok((
                StatusCode::CREATED,
                response_headers,
                Json(ApiResponse::ok(TokenData::bearer(tokens.access))),
            ))
        }
    }
}
