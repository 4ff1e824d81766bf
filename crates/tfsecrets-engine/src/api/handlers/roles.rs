//! Role Handlers
//!
//! `roles/<name>` path: create/update, read, delete, and list.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use tfsecrets_core::{Role, RoleKind, RoleScope};

use crate::api::error::ApiError;
use crate::api::handlers::AppState;

/// Role definition as written by an administrator
///
/// `kind` may be omitted; it is then inferred from `team_id`.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RoleRequest {
    #[serde(default)]
    pub kind: Option<RoleKind>,

    #[serde(default)]
    pub organization: Option<String>,

    #[serde(default)]
    pub team_id: Option<String>,

    /// Lease TTL in seconds
    #[serde(default)]
    pub ttl: u64,

    /// Maximum lease TTL in seconds
    #[serde(default)]
    pub max_ttl: u64,
}

impl RoleRequest {
    /// Decode into a validated role named `name`
    pub fn into_role(self, name: String) -> Result<Role, ApiError> {
        let scope = RoleScope::from_parts(self.kind, self.organization, self.team_id)?;
        Ok(Role::new(name, scope)?.with_ttls(self.ttl, self.max_ttl)?)
    }
}

/// Role names listing
#[derive(Debug, Serialize)]
pub struct ListRolesResponse {
    pub keys: Vec<String>,
}

/// Create or replace a role
///
/// POST /v1/roles/{name}
pub async fn write_role(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    Json(request): Json<RoleRequest>,
) -> Result<StatusCode, ApiError> {
    let role = request.into_role(name)?;
    state.engine.upsert_role(role).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Read a role
///
/// GET /v1/roles/{name}
pub async fn read_role(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Json<Role>, ApiError> {
    Ok(Json(state.engine.get_role(&name).await?))
}

/// Delete a role
///
/// DELETE /v1/roles/{name}
pub async fn delete_role(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.engine.delete_role(&name).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// List role names
///
/// GET /v1/roles
pub async fn list_roles(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ListRolesResponse>, ApiError> {
    let keys = state.engine.list_roles().await?;
    Ok(Json(ListRolesResponse { keys }))
}
