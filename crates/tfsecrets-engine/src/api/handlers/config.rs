//! Configuration Handlers
//!
//! `config` path: write, read and delete the trust-anchor configuration.

use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;
use std::sync::Arc;

use tfsecrets_core::ConfigView;

use crate::api::error::ApiError;
use crate::api::handlers::AppState;

/// Request to write the configuration
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigRequest {
    /// Trust-anchor API token
    pub token: String,

    /// Upstream base URL (defaults to Terraform Cloud)
    #[serde(default)]
    pub address: Option<String>,
}

/// Write the configuration
///
/// POST /v1/config
pub async fn write_config(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ConfigRequest>,
) -> Result<StatusCode, ApiError> {
    state
        .engine
        .set_config(request.token, request.address)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Read the configuration without the token
///
/// GET /v1/config
pub async fn read_config(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ConfigView>, ApiError> {
    state
        .engine
        .read_config()
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("backend is not configured".into()))
}

/// Delete the configuration
///
/// DELETE /v1/config
pub async fn delete_config(State(state): State<Arc<AppState>>) -> Result<StatusCode, ApiError> {
    state.engine.delete_config().await?;
    Ok(StatusCode::NO_CONTENT)
}
