//! Domain error taxonomy and its mapping onto HTTP responses.
//!
//! Every variant carries a user-safe message; the `Internal` payload is
//! logged server-side and never forwarded to the client. "Not found" and
//! "not owned" share one variant so ownership misses cannot be told apart
//! from nonexistence.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

use super::response::ApiResponse;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Login failure; collapses unknown email and wrong password.
    #[error("Invalid credentials")]
    AuthenticationFailed,
    /// Missing, invalid, expired, or wrong-type token; or the subject is gone.
    #[error("Not authenticated")]
    Unauthenticated,
    #[error("{0}")]
    Conflict(&'static str),
    #[error("{0}")]
    NotFound(&'static str),
    #[error("{0}")]
    Validation(String),
    #[error("Internal server error")]
    Internal(anyhow::Error),
}

impl ApiError {
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::AuthenticationFailed | Self::Unauthenticated => StatusCode::UNAUTHORIZED,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let Self::Internal(err) = &self {
            error!("Unhandled internal error: {err:?}");
        }
        let status = self.status();
        let body = ApiResponse::err(self.to_string());
        (status, Json(body)).into_response()
    }
}
