//! Lease Handlers
//!
//! Renew and revoke take the full secret returned at issuance.

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use std::sync::Arc;

use tfsecrets_core::{IssuedSecret, LeaseId, LeaseView};

use crate::api::error::ApiError;
use crate::api::handlers::{request_context, AppState};
use crate::engine::LeasedSecret;

/// Renew a lease
///
/// POST /v1/leases/renew
pub async fn renew_lease(
    State(state): State<Arc<AppState>>,
    Json(secret): Json<IssuedSecret>,
) -> Result<Json<LeasedSecret>, ApiError> {
    Ok(Json(state.engine.renew(&secret).await?))
}

/// Revoke a lease
///
/// POST /v1/leases/revoke
pub async fn revoke_lease(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(secret): Json<IssuedSecret>,
) -> Result<StatusCode, ApiError> {
    let ctx = request_context(&state, &headers)?;
    state.engine.revoke(&secret, &ctx).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Look up a lease's non-secret metadata
///
/// GET /v1/leases/{lease_id}
pub async fn lookup_lease(
    State(state): State<Arc<AppState>>,
    Path(lease_id): Path<String>,
) -> Result<Json<LeaseView>, ApiError> {
    let lease_id: LeaseId = lease_id.parse()?;
    Ok(Json(state.engine.lookup_lease(lease_id).await?))
}
