//! API error type.
//!
//! Every handler returns `Result<_, ApiError>`; the error renders as
//! `{"error": "..."}` with the status picked by [`GatewayError::http_status`].

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use studio_core::{api::ErrorBody, GatewayError};
use tracing::{error, warn};

/// Error answered by an endpoint
#[derive(Debug, Clone)]
pub struct ApiError {
    /// HTTP status
    pub status: StatusCode,
    /// Client-facing message
    pub message: String,
}

impl ApiError {
    /// Create an error with an explicit status
    #[must_use]
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// 400
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    /// 500
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

impl From<GatewayError> for ApiError {
    fn from(err: GatewayError) -> Self {
        let status =
            StatusCode::from_u16(err.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if status.is_server_error() {
            error!(
                status = status.as_u16(),
                error_type = err.error_type(),
                upstream_status = ?err.upstream_status(),
                error = %err,
                "Request failed"
            );
        } else {
            warn!(
                status = status.as_u16(),
                error_type = err.error_type(),
                error = %err,
                "Request rejected"
            );
        }

        Self::new(status, err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorBody {
                error: self.message,
            }),
        )
            .into_response()
    }
}
