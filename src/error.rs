use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Adapter-level error types for adroll.
///
/// The sequencer core never fails toward a viewer; these only cover the
/// HTTP host and the ad pool sources around it.
#[derive(Error, Debug)]
pub enum AdrollError {
    #[error("Session not found: {0}")]
    SessionNotFound(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Ad pool unavailable: {0}")]
    PoolUnavailable(String),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl IntoResponse for AdrollError {
    fn into_response(self) -> Response {
        let status = match self {
            AdrollError::SessionNotFound(ref id) => {
                tracing::debug!("Unknown session: {}", id);
                StatusCode::NOT_FOUND
            }
            AdrollError::InvalidRequest(ref e) => {
                tracing::warn!("Rejected request: {}", e);
                StatusCode::BAD_REQUEST
            }
            AdrollError::PoolUnavailable(ref e) => {
                tracing::error!("Ad pool unavailable: {}", e);
                StatusCode::BAD_GATEWAY
            }
            AdrollError::Http(ref e) => {
                tracing::error!("HTTP client error: {:?}", e);
                StatusCode::BAD_GATEWAY
            }
            AdrollError::ConfigError(ref e) => {
                tracing::error!("Configuration error: {}", e);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        (status, self.to_string()).into_response()
    }
}

/// Malformed or mistyped JSON bodies answer 400 like any other bad request
impl From<JsonRejection> for AdrollError {
    fn from(rejection: JsonRejection) -> Self {
        AdrollError::InvalidRequest(rejection.body_text())
    }
}

// Convenience type alias for Results
pub type Result<T> = std::result::Result<T, AdrollError>;
