//! HTTP error type and mapping to the JSON error envelope.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use lmgate_core::CapabilityError;
use thiserror::Error;

use crate::models::ErrorResponse;

/// Errors a route can return before a response has started.
#[derive(Debug, Error)]
pub enum HttpError {
    /// Bad request (invalid input).
    #[error("{0}")]
    BadRequest(String),

    /// No route for the path.
    #[error("{0}")]
    NotFound(String),

    /// Capability or transport failure.
    #[error("{0}")]
    Internal(String),
}

impl HttpError {
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        (status, Json(ErrorResponse::new(self.to_string()))).into_response()
    }
}

impl From<CapabilityError> for HttpError {
    fn from(err: CapabilityError) -> Self {
        // Every capability failure, including a missing model, is a server
        // side condition from the client's point of view.
        Self::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            HttpError::BadRequest("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            HttpError::NotFound("x".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            HttpError::from(CapabilityError::NoModelAvailable).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_capability_message_is_preserved() {
        let err = HttpError::from(CapabilityError::RequestFailed("quota".into()));
        assert_eq!(err.to_string(), "Model request failed: quota");
    }
}
