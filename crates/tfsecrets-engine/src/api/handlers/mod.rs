//! API request handlers

pub mod config;
pub mod creds;
pub mod leases;
pub mod roles;

pub use config::{delete_config, read_config, write_config, ConfigRequest};
pub use creds::{issue_creds, CredsResponse, TokenData};
pub use leases::{lookup_lease, renew_lease, revoke_lease};
pub use roles::{delete_role, list_roles, read_role, write_role, ListRolesResponse, RoleRequest};

use axum::http::HeaderMap;
use std::time::Duration;

use crate::api::error::ApiError;
use crate::engine::{Engine, RequestContext};

/// Header carrying a per-request upstream timeout, in seconds
pub const REQUEST_TIMEOUT_HEADER: &str = "x-request-timeout";

/// Application state shared across handlers
pub struct AppState {
    pub engine: Engine,
}

impl AppState {
    pub fn new(engine: Engine) -> Self {
        Self { engine }
    }
}

/// Build the request context for an operation
///
/// Uses the engine's upstream timeout unless the caller supplied
/// `X-Request-Timeout`.
pub fn request_context(state: &AppState, headers: &HeaderMap) -> Result<RequestContext, ApiError> {
    let Some(value) = headers.get(REQUEST_TIMEOUT_HEADER) else {
        return Ok(state.engine.default_context());
    };

    let secs = value
        .to_str()
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
        .filter(|secs| *secs > 0)
        .ok_or_else(|| {
            ApiError::BadRequest(format!(
                "{} must be a positive number of seconds",
                REQUEST_TIMEOUT_HEADER
            ))
        })?;

    Ok(RequestContext::new(Duration::from_secs(secs)))
}
