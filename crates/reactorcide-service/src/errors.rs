//! HTTP-facing error envelope: `{"error": "<kind>", "message": "<text>"}`
//! (§6), with `CoreError` mapped 1:1 onto status codes.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use reactorcide_core::CoreError;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    pub message: String,
}

/// Wraps a [`CoreError`] for use as an Axum handler return type.
#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct ApiError(#[from] pub CoreError);

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match &self.0 {
            CoreError::NotFound(_) => StatusCode::NOT_FOUND,
            CoreError::InvalidInput(_) | CoreError::InvalidPath(_) | CoreError::InvalidKey(_) => {
                StatusCode::BAD_REQUEST
            }
            CoreError::AlreadyExists(_) => StatusCode::CONFLICT,
            CoreError::Forbidden(_) | CoreError::CannotDecommissionPrimary => StatusCode::FORBIDDEN,
            CoreError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            CoreError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            CoreError::PreconditionFailed(_) => StatusCode::PRECONDITION_FAILED,
            CoreError::InvalidSignature => StatusCode::UNAUTHORIZED,
            CoreError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self.0, "internal error");
        }
        let body = ErrorBody { error: self.0.kind(), message: self.0.to_string() };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
#[path = "errors_tests.rs"]
mod tests;
