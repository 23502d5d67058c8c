//! API error types with HTTP response mapping.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use participant::ParticipantError;

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Resource not found.
    NotFound(String),
    /// Bad request from the client.
    BadRequest(String),
    /// A command handler failed.
    Participant(ParticipantError),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Participant(err) => participant_status(err),
        }
    }

    fn code(&self) -> &'static str {
        match self {
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::BadRequest(_) => "VALIDATION_ERROR",
            ApiError::Participant(err) => err.code(),
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, ApiError::Participant(err) if err.is_retryable())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();
        let retryable = self.retryable();

        let message = match self {
            ApiError::NotFound(msg) | ApiError::BadRequest(msg) => msg,
            ApiError::Participant(err) => {
                if status == StatusCode::INTERNAL_SERVER_ERROR {
                    tracing::error!(error = %err, code, "command failed");
                } else if status.is_server_error() {
                    tracing::warn!(error = %err, code, "command failed");
                }
                err.to_string()
            }
        };

        let body = serde_json::json!({
            "error": message,
            "code": code,
            "retryable": retryable,
        });
        (status, axum::Json(body)).into_response()
    }
}

fn participant_status(err: &ParticipantError) -> StatusCode {
    match err {
        ParticipantError::Validation(_) => StatusCode::BAD_REQUEST,
        ParticipantError::InvalidAmount { .. } | ParticipantError::LimitExceeded { .. } => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        ParticipantError::NotFound { .. } => StatusCode::NOT_FOUND,
        ParticipantError::InvalidStateTransition { .. } => StatusCode::CONFLICT,
        ParticipantError::TransientResourceUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
        ParticipantError::Store(e) if e.is_transient() => StatusCode::SERVICE_UNAVAILABLE,
        ParticipantError::Store(_) | ParticipantError::Serialization(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl From<ParticipantError> for ApiError {
    fn from(err: ParticipantError) -> Self {
        ApiError::Participant(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}
