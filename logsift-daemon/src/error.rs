//! HTTP error mapping.
//!
//! Every failure leaves the boundary as `{"error": "<message>"}` with a status
//! code chosen from the engine error kind. Internal details are logged, not
//! returned.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use logsift_engine::EngineError;
use serde_json::json;

/// Message returned when the batch body carries no log text.
pub const NO_LOGS_MESSAGE: &str = "No logs provided";

/// Error returned by HTTP handlers.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Malformed body or missing input (400).
    #[error("{0}")]
    BadRequest(String),

    /// Body or input exceeds the configured limit (413).
    #[error("{0}")]
    PayloadTooLarge(String),

    /// Unknown decoder id (404).
    #[error("{0}")]
    NotFound(String),

    /// Rule store could not be read (503).
    #[error("rule store unavailable")]
    StoreUnavailable,

    /// Batch deadline exceeded (504).
    #[error("{0}")]
    Timeout(String),

    /// Anything else (500).
    #[error("Internal Server Error")]
    Internal,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::StoreUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            Self::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<EngineError> for ApiError {
    fn from(e: EngineError) -> Self {
        match e {
            EngineError::InputTooLarge { .. } => Self::PayloadTooLarge(e.to_string()),
            EngineError::DeadlineExceeded { .. } => Self::Timeout(e.to_string()),
            EngineError::DecoderNotFound { .. } => Self::NotFound(e.to_string()),
            EngineError::Store(store) => {
                tracing::error!(error = %store, "rule store fetch failed");
                Self::StoreUnavailable
            }
            other => {
                tracing::error!(error = %other, "unexpected engine error");
                Self::Internal
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        // an exceeded body limit is reported by axum as 413
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            Self::PayloadTooLarge(rejection.body_text())
        } else {
            Self::BadRequest(rejection.body_text())
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({ "error": self.to_string() }));
        (self.status(), body).into_response()
    }
}
