use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use common::CoreError;
use service::errors::ServiceError;
use thiserror::Error;
use tracing::error;

use crate::observability::UPSTREAM_ERRORS_TOTAL;

/// JSON error body: `{"error": "...", "details": "..."}`.
#[derive(Debug)]
pub struct JsonApiError {
    pub status: StatusCode,
    pub error: String,
    pub details: Option<String>,
}

impl JsonApiError {
    pub fn new(status: StatusCode, error: impl Into<String>, details: Option<String>) -> Self {
        Self { status, error: error.into(), details }
    }

    pub fn bad_request(error: impl Into<String>, details: Option<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, error, details)
    }

    /// Map a service failure under the route's error label.
    pub fn from_service(error: impl Into<String>, e: ServiceError) -> Self {
        let status = match e {
            ServiceError::Validation(_) => StatusCode::BAD_REQUEST,
            ServiceError::Upstream(_) => {
                UPSTREAM_ERRORS_TOTAL.inc();
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ServiceError::Config(_) | ServiceError::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self::new(status, error, Some(e.to_string()))
    }
}

impl IntoResponse for JsonApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!(status = self.status.as_u16(), error = %self.error, details = ?self.details, "request failed");
        }
        let mut body = serde_json::json!({ "error": self.error });
        if let Some(d) = self.details {
            body["details"] = serde_json::Value::String(d);
        }
        (self.status, Json(body)).into_response()
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("http client setup failed: {0}")]
    Client(#[from] CoreError),
    #[error(transparent)]
    Any(#[from] anyhow::Error),
}
