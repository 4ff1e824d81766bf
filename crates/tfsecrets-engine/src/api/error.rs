//! API error types and responses

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use tfsecrets_core::EngineError;

/// API error type
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// The engine is missing a prerequisite (configuration)
    #[error("Precondition failed: {0}")]
    PreconditionFailed(String),

    /// The lease is in a state that forbids the operation
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Upstream error: {0}")]
    Upstream(String, Option<u16>),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::PreconditionFailed(_) => StatusCode::PRECONDITION_FAILED,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Upstream(..) => StatusCode::BAD_GATEWAY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// API error response body
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (code, message, details) = match self {
            ApiError::BadRequest(msg) => ("BAD_REQUEST", msg, None),
            ApiError::NotFound(msg) => ("NOT_FOUND", msg, None),
            ApiError::PreconditionFailed(msg) => ("PRECONDITION_FAILED", msg, None),
            ApiError::Conflict(msg) => ("CONFLICT", msg, None),
            ApiError::Upstream(msg, upstream_status) => (
                "UPSTREAM_ERROR",
                msg,
                upstream_status.map(|s| serde_json::json!({ "upstream_status": s })),
            ),
            ApiError::Internal(msg) => ("INTERNAL_ERROR", msg, None),
        };

        let body = ErrorResponse {
            error: message,
            code: code.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        let message = err.to_string();
        match err {
            EngineError::Validation(_) => ApiError::BadRequest(message),
            EngineError::RoleNotFound(_) | EngineError::LeaseNotFound(_) => {
                ApiError::NotFound(message)
            }
            EngineError::ConfigurationMissing => ApiError::PreconditionFailed(message),
            EngineError::AlreadyRevoked(_) | EngineError::LeaseExpired(_) => {
                ApiError::Conflict(message)
            }
            EngineError::Upstream { status, .. } => ApiError::Upstream(message, status),
            EngineError::Storage(_) => ApiError::Internal(message),
        }
    }
}
