//! Authenticated self-service endpoints.
//!
//! Flow Overview:
//! 1) Authenticate via the bearer access token.
//! 2) Resolve the current user from the database.
//! 3) Apply allow-listed updates (username only; email never changes).

use axum::{
    Json,
    extract::Extension,
    http::HeaderMap,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::api::{error::ApiError, response::ApiResponse};

use super::auth::{
    AuthState,
    principal::require_auth,
    storage::{UserRecord, UpdateUsernameOutcome, update_username},
    utils::valid_username,
};

#[derive(Debug, Serialize, ToSchema)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub created_at: DateTime<Utc>,
}

impl From<UserRecord> for UserResponse {
    fn from(user: UserRecord) -> Self {
        Self {
            id: user.id,
            email: user.email,
            username: user.username,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct MeUpdateRequest {
    pub username: Option<String>,
}

#[utoipa::path(
    get,
    path = "/v1/me",
    responses(
        (status = 200, description = "The authenticated user's profile", body = ApiResponse<UserResponse>),
        (status = 401, description = "Missing or invalid access token"),
    ),
    tag = "me"
)]
pub async fn get_me(
    headers: HeaderMap,
    pool: Extension<PgPool>,
    auth_state: Extension<Arc<AuthState>>,
) -> Result<Json<ApiResponse<UserResponse>>, ApiError> {
    let principal = require_auth(&headers, &pool, &auth_state).await?;
    Ok(Json(ApiResponse::ok(UserResponse::from(principal.user))))
}

#[utoipa::path(
    patch,
    path = "/v1/me",
    request_body = MeUpdateRequest,
    responses(
        (status = 200, description = "Profile updated; only the username can change", body = ApiResponse<UserResponse>),
        (status = 401, description = "Missing or invalid access token"),
        (status = 409, description = "Username already taken"),
        (status = 422, description = "Invalid username"),
    ),
    tag = "me"
)]
pub async fn patch_me(
    headers: HeaderMap,
    pool: Extension<PgPool>,
    auth_state: Extension<Arc<AuthState>>,
    payload: Option<Json<MeUpdateRequest>>,
) -> Result<Json<ApiResponse<UserResponse>>, ApiError> {
    let principal = require_auth(&headers, &pool, &auth_state).await?;

    let Some(Json(payload)) = payload else {
        return Err(ApiError::Validation(
            "Missing or malformed JSON payload".to_string(),
        ));
    };

    // No username supplied: nothing to change, echo the current profile.
    let Some(username) = payload.username else {
        return Ok(Json(ApiResponse::ok(UserResponse::from(principal.user))));
    };

    if !valid_username(&username) {
        return Err(ApiError::Validation(
            "Username must be 3-30 characters of letters, digits, or underscore".to_string(),
        ));
    }

    match update_username(&pool, principal.user.id, &username).await? {
        UpdateUsernameOutcome::Updated(user) => Ok(Json(ApiResponse::ok(UserResponse::from(user)))),
        UpdateUsernameOutcome::Conflict => Err(ApiError::Conflict("Username already taken")),
        UpdateUsernameOutcome::Missing => Err(ApiError::NotFound("User not found")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn user_response_excludes_password_material() {
        let user = UserRecord {
            id: Uuid::nil(),
            email: "alice@example.com".to_string(),
            username: "alice".to_string(),
            created_at: Utc::now(),
        };
        let value = serde_json::to_value(UserResponse::from(user)).expect("json");
        let object = value.as_object().expect("object");
        assert!(object.contains_key("email"));
        assert!(object.contains_key("username"));
        assert!(!object.contains_key("password_hash"));
    }
}
