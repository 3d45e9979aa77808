use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::core::relay::RelayError;
use crate::core::session::SessionError;

/// HTTP-facing errors. Bodies are plain text.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Origin not allowed")]
    Forbidden,

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    ServiceUnavailable(String),

    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("{0}")]
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Upstream(_) => StatusCode::BAD_GATEWAY,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (self.status(), self.to_string()).into_response()
    }
}

impl From<SessionError> for AppError {
    fn from(err: SessionError) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

impl From<RelayError> for AppError {
    fn from(err: RelayError) -> Self {
        match err {
            RelayError::MissingApiKey => AppError::ServiceUnavailable(err.to_string()),
            RelayError::InvalidEndpoint(_) | RelayError::Serialization(_) => {
                AppError::Internal(err.to_string())
            }
            RelayError::ConnectionFailed(_) | RelayError::Timeout(_) | RelayError::WebSocket(_) => {
                AppError::Upstream(err.to_string())
            }
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
