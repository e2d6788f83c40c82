//! Error responses for the HTTP surface.
//!
//! Every failure is rendered as `{"error": ..., "code": ...}`. Internal
//! errors are logged in full and reported with a generic message.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::{Deserialize, Serialize};

use crate::domain::errors::DomainError;

/// Error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", message)
    }

    pub fn task_not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND, "TASK_NOT_FOUND", "Task not found")
    }

    fn internal() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", "Internal server error")
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        if err.is_internal() {
            tracing::error!(error = %err, "request failed with internal error");
            return Self::internal();
        }

        match err {
            DomainError::TaskNotFound(_) => Self::task_not_found(),
            DomainError::EmailAlreadyRegistered(_) => {
                Self::new(StatusCode::CONFLICT, "EMAIL_ALREADY_REGISTERED", "Email already registered")
            }
            DomainError::InvalidCredentials => {
                Self::new(StatusCode::UNAUTHORIZED, "INVALID_CREDENTIALS", "Invalid email or password")
            }
            DomainError::InvalidToken(_) => Self::unauthorized("Invalid or expired token"),
            DomainError::ValidationFailed(message) => {
                Self::new(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", message)
            }
            other => {
                tracing::error!(error = %other, "request failed with unclassified error");
                Self::internal()
            }
        }
    }
}

/// Malformed bodies, wrong content types and schema mismatches are all 400.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: self.message,
            code: self.code.to_string(),
        };
        (self.status, Json(body)).into_response()
    }
}
