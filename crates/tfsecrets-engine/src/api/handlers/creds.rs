//! Credential Handler
//!
//! `creds/<name>` path: reading it mints a new token and opens a lease.

use axum::{
    extract::{Path, State},
    http::HeaderMap,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use tfsecrets_core::{IssuedSecret, LeaseId};

use crate::api::error::ApiError;
use crate::api::handlers::{request_context, AppState};
use crate::engine::LeasedSecret;

/// Public payload of an issued credential
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenData {
    pub token: String,
}

/// Response from issuing a credential
///
/// `secret` is the full value to present back for renew and revoke.
#[derive(Debug, Serialize, Deserialize)]
pub struct CredsResponse {
    pub data: TokenData,
    pub secret: IssuedSecret,
    pub lease_id: LeaseId,
    pub lease_duration: u64,
    pub renewable: bool,
    pub expires_at: DateTime<Utc>,
}

impl From<LeasedSecret> for CredsResponse {
    fn from(leased: LeasedSecret) -> Self {
        Self {
            data: TokenData {
                token: leased.secret.token.clone(),
            },
            lease_id: leased.secret.lease_id,
            lease_duration: leased.lease_duration,
            renewable: true,
            expires_at: leased.expires_at,
            secret: leased.secret,
        }
    }
}

/// Issue a credential for a role
///
/// GET /v1/creds/{name}
pub async fn issue_creds(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    headers: HeaderMap,
) -> Result<Json<CredsResponse>, ApiError> {
    let ctx = request_context(&state, &headers)?;
    let leased = state.engine.issue(&name, &ctx).await?;
    Ok(Json(leased.into()))
}
