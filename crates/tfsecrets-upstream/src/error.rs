//! Error types for upstream token providers

use std::time::Duration;
use thiserror::Error;

use tfsecrets_core::EngineError;

/// Result type for upstream operations
pub type Result<T> = std::result::Result<T, UpstreamError>;

/// Errors that can occur while calling the upstream provider
#[derive(Error, Debug)]
pub enum UpstreamError {
    /// Upstream answered with a non-success status
    #[error("Upstream returned status {status}: {message}")]
    Status { status: u16, message: String },

    /// Transport-level failure (DNS, TLS, connection reset, ...)
    #[error("HTTP error: {0}")]
    Http(String),

    /// The call did not complete within the request deadline
    #[error("Upstream call timed out after {0:?}")]
    Timeout(Duration),

    /// Success status but a body we could not understand
    #[error("Invalid upstream response: {0}")]
    InvalidResponse(String),

    /// The configured address is not a usable base URL
    #[error("Invalid upstream address: {0}")]
    InvalidAddress(String),
}

impl UpstreamError {
    /// HTTP status reported by the upstream, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            UpstreamError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for UpstreamError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            UpstreamError::InvalidResponse(err.to_string())
        } else {
            UpstreamError::Http(err.to_string())
        }
    }
}

impl From<serde_json::Error> for UpstreamError {
    fn from(err: serde_json::Error) -> Self {
        UpstreamError::InvalidResponse(err.to_string())
    }
}

impl From<UpstreamError> for EngineError {
    fn from(err: UpstreamError) -> Self {
        let status = err.status();
        let message = match err {
            UpstreamError::Status { message, .. } => message,
            other => other.to_string(),
        };
        EngineError::Upstream { status, message }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_preserved_in_engine_error() {
        let err: EngineError = UpstreamError::Status {
            status: 404,
            message: "organization not found".into(),
        }
        .into();

        assert_eq!(
            err,
            EngineError::Upstream {
                status: Some(404),
                message: "organization not found".into(),
            }
        );
    }

    #[test]
    fn test_timeout_has_no_status() {
        let err: EngineError = UpstreamError::Timeout(Duration::from_secs(5)).into();
        match err {
            EngineError::Upstream { status, message } => {
                assert_eq!(status, None);
                assert!(message.contains("timed out"));
            }
            other => panic!("Expected Upstream error, got {:?}", other),
        }
    }
}
