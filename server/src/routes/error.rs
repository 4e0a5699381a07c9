//! HTTP error body shared by every route.
//!
//! Errors render as `{"detail": "..."}` with a matching status, the shape the
//! portal client reads back into its own error type.

#[cfg(test)]
#[path = "error_test.rs"]
mod tests;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};

use crate::services::ServiceError;
use crate::services::auth::AuthError;
use crate::services::token::TokenError;

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub detail: String,
}

impl ApiError {
    pub fn new(status: StatusCode, detail: impl Into<String>) -> Self {
        Self { status, detail: detail.into() }
    }

    pub fn unauthorized(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, detail)
    }

    pub fn internal() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(serde_json::json!({ "detail": self.detail }))).into_response()
    }
}

pub(crate) fn service_error_to_status(err: &ServiceError) -> StatusCode {
    match err {
        ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
        ServiceError::Forbidden(_) => StatusCode::FORBIDDEN,
        ServiceError::Conflict(_) => StatusCode::CONFLICT,
        ServiceError::BadRequest(_) | ServiceError::Invalid(_) => StatusCode::BAD_REQUEST,
        ServiceError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        let status = service_error_to_status(&err);
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %err, "service call failed");
            return Self::internal();
        }
        let detail = match &err {
            ServiceError::NotFound(what) => format!("{} not found", capitalize(what)),
            other => other.to_string(),
        };
        Self::new(status, detail)
    }
}

impl From<TokenError> for ApiError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Invalid => Self::unauthorized("Invalid or expired token"),
            TokenError::Sign(e) => {
                tracing::error!(error = %e, "token signing failed");
                Self::internal()
            }
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::NotWhitelisted(_) => {
                Self::new(StatusCode::FORBIDDEN, "Email not whitelisted. Contact your club advisor for access.")
            }
            AuthError::TokenExchange(_) | AuthError::GoogleApi(_) => {
                tracing::error!(error = %err, "google login failed");
                Self::new(StatusCode::BAD_GATEWAY, "Google sign-in failed")
            }
            AuthError::Service(e) => e.into(),
            AuthError::Token(e) => e.into(),
        }
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
