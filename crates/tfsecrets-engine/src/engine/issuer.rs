//! Credential issuance

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use tfsecrets_core::{IssuedSecret, LeaseId, LeaseRecord, Result};
use tfsecrets_upstream::TokenRequest;

use super::{bounded, Engine, RequestContext};
use crate::storage::{put_json, LEASE_PREFIX};

pub(crate) fn lease_key(lease_id: &LeaseId) -> String {
    format!("{}{}", LEASE_PREFIX, lease_id)
}

/// A secret together with its current lease window
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeasedSecret {
    pub secret: IssuedSecret,
    pub expires_at: DateTime<Utc>,
    /// Seconds until `expires_at`
    pub lease_duration: u64,
}

impl LeasedSecret {
    pub(crate) fn from_record(record: &LeaseRecord, now: DateTime<Utc>) -> Self {
        Self {
            secret: record.secret.clone(),
            expires_at: record.expires_at,
            lease_duration: record.remaining_secs(now),
        }
    }
}

impl Engine {
    /// Mint a fresh upstream token for `role_name` and open a lease for it
    ///
    /// Every call mints a distinct token and lease. Nothing is persisted
    /// unless the upstream call succeeds.
    pub async fn issue(&self, role_name: &str, ctx: &RequestContext) -> Result<LeasedSecret> {
        let config = self.trust_anchor().await?;
        let role = self.get_role(role_name).await?;

        let request = TokenRequest::new(&config, role.scope.clone());
        let minted = bounded(ctx, self.provider.create_token(&request))
            .await
            .inspect_err(|e| {
                warn!(role = %role.name, error = %e, "Upstream token creation failed");
            })?;

        let (ttl, max_ttl) = self.effective_ttls(&role);
        let now = self.now();
        let secret = IssuedSecret {
            lease_id: LeaseId::generate(),
            token: minted.token,
            token_id: minted.token_id,
            role: role.name,
            scope: role.scope,
            issued_at: now,
        };

        let record = LeaseRecord::new(secret, ttl, max_ttl);
        put_json(self.store.as_ref(), &lease_key(&record.lease_id()), &record).await?;

        info!(
            lease_id = %record.lease_id(),
            role = %record.secret.role,
            kind = %record.secret.scope.kind(),
            expires_at = %record.expires_at,
            "Issued lease"
        );
        Ok(LeasedSecret::from_record(&record, now))
    }
}
