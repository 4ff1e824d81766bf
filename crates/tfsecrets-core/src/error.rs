//! Error types for the secrets engine

use thiserror::Error;

/// Result type alias using EngineError
pub type Result<T> = std::result::Result<T, EngineError>;

/// Errors that can occur while configuring the engine or managing leases
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// Malformed input (empty token, missing team_id, ...)
    #[error("Validation failed: {0}")]
    Validation(String),

    /// No role with the given name
    #[error("Role not found: {0}")]
    RoleNotFound(String),

    /// Issuance attempted before the trust anchor was configured
    #[error("Backend is not configured: write the config path first")]
    ConfigurationMissing,

    /// Upstream provider rejected or failed the call
    #[error("Upstream error{}: {message}", .status.map(|s| format!(" (status {})", s)).unwrap_or_default())]
    Upstream {
        status: Option<u16>,
        message: String,
    },

    /// Unknown lease handle, or a secret that does not match its lease
    #[error("Lease not found: {0}")]
    LeaseNotFound(String),

    /// Renewal of a lease that was revoked
    #[error("Lease {0} has already been revoked")]
    AlreadyRevoked(String),

    /// Renewal of a lease past its maximum TTL
    #[error("Lease {0} has reached its maximum TTL")]
    LeaseExpired(String),

    /// Storage collaborator failure
    #[error("Storage error: {0}")]
    Storage(String),
}

impl EngineError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn upstream(status: Option<u16>, message: impl Into<String>) -> Self {
        Self::Upstream {
            status,
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for EngineError {
    fn from(err: serde_json::Error) -> Self {
        EngineError::Storage(format!("Serialization error: {}", err))
    }
}
