//! Lease renewal, revocation and lookup
//!
//! Renew and revoke hold the lease's lock for the whole read-modify-write, so
//! operations on one lease never interleave.

use tracing::{debug, info, warn};

use tfsecrets_core::{EngineError, IssuedSecret, LeaseId, LeaseRecord, LeaseView, Result};
use tfsecrets_upstream::TokenRequest;

use super::issuer::lease_key;
use super::{bounded, Engine, LeasedSecret, RequestContext, RevocationMode};
use crate::storage::{get_json, put_json};

impl Engine {
    /// Extend the lease of a previously issued secret
    ///
    /// The returned secret is identical to `secret`; only the expiry moves.
    pub async fn renew(&self, secret: &IssuedSecret) -> Result<LeasedSecret> {
        let _guard = self.lease_locks.lock(secret.lease_id).await;
        let mut record = self.load_matching(secret).await?;

        let now = self.now();
        if let Err(e) = record.renew(now) {
            warn!(lease_id = %secret.lease_id, error = %e, "Lease renewal rejected");
            return Err(e);
        }
        put_json(self.store.as_ref(), &lease_key(&secret.lease_id), &record).await?;

        info!(
            lease_id = %secret.lease_id,
            expires_at = %record.expires_at,
            renewals = record.renewals,
            "Renewed lease"
        );
        Ok(LeasedSecret::from_record(&record, now))
    }

    /// End the lease of a previously issued secret
    ///
    /// Idempotent: revoking a revoked lease succeeds without side effects.
    /// Returns whether this call performed the transition. In
    /// [`RevocationMode::Upstream`] the upstream token is deleted first; if
    /// that fails the lease stays active.
    pub async fn revoke(&self, secret: &IssuedSecret, ctx: &RequestContext) -> Result<bool> {
        let _guard = self.lease_locks.lock(secret.lease_id).await;
        let mut record = self.load_matching(secret).await?;

        if record.is_revoked() {
            debug!(lease_id = %secret.lease_id, "Lease already revoked");
            return Ok(false);
        }

        if self.config.revocation == RevocationMode::Upstream {
            let config = self.trust_anchor().await?;
            let request = TokenRequest::new(&config, record.secret.scope.clone());
            bounded(ctx, self.provider.revoke_token(&request))
                .await
                .inspect_err(|e| {
                    warn!(lease_id = %secret.lease_id, error = %e, "Upstream revocation failed");
                })?;
        }

        record.revoke(self.now());
        put_json(self.store.as_ref(), &lease_key(&secret.lease_id), &record).await?;

        info!(
            lease_id = %secret.lease_id,
            role = %record.secret.role,
            upstream = self.config.revocation == RevocationMode::Upstream,
            "Revoked lease"
        );
        Ok(true)
    }

    /// Non-secret view of a lease
    pub async fn lookup_lease(&self, lease_id: LeaseId) -> Result<LeaseView> {
        self.load(lease_id).await.map(|record| record.view())
    }

    async fn load(&self, lease_id: LeaseId) -> Result<LeaseRecord> {
        let record: Option<LeaseRecord> =
            get_json(self.store.as_ref(), &lease_key(&lease_id)).await?;
        record.ok_or_else(|| EngineError::LeaseNotFound(lease_id.to_string()))
    }

    /// Load a lease and check the presented secret is the one it was opened for
    async fn load_matching(&self, secret: &IssuedSecret) -> Result<LeaseRecord> {
        let record = self.load(secret.lease_id).await?;
        if !record.matches(secret) {
            warn!(lease_id = %secret.lease_id, "Presented secret does not match lease");
            return Err(EngineError::LeaseNotFound(secret.lease_id.to_string()));
        }
        Ok(record)
    }
}
