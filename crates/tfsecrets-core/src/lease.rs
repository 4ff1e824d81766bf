//! Issued secrets and their leases
//!
//! An [`IssuedSecret`] is a value handed to the consumer; it is presented back
//! in full to renew or revoke. The engine keeps a [`LeaseRecord`] per secret
//! holding the state machine:
//!
//! ```text
//! Active --renew--> Active --revoke--> Revoked (terminal)
//! ```
//!
//! Renewal only moves expiry bookkeeping; the secret itself never changes.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::{EngineError, Result};
use crate::role::RoleScope;

/// Opaque lease handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LeaseId(Uuid);

impl LeaseId {
    /// Generate a fresh random handle
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for LeaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for LeaseId {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|_| EngineError::LeaseNotFound(s.to_string()))
    }
}

/// A token issued against a role, together with its lease handle
///
/// The scope is a snapshot of the role at issuance time, so later role
/// updates do not affect secrets already handed out.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuedSecret {
    /// Lease handle
    pub lease_id: LeaseId,

    /// Upstream API token
    pub token: String,

    /// Upstream identifier of the token (e.g. `at-...`), when provided
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_id: Option<String>,

    /// Name of the role the secret was issued against
    pub role: String,

    /// Role scope at issuance
    pub scope: RoleScope,

    /// Issuance time
    pub issued_at: DateTime<Utc>,
}

impl fmt::Debug for IssuedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IssuedSecret")
            .field("lease_id", &self.lease_id)
            .field("token", &"<redacted>")
            .field("token_id", &self.token_id)
            .field("role", &self.role)
            .field("scope", &self.scope)
            .field("issued_at", &self.issued_at)
            .finish()
    }
}

/// Lease lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeaseState {
    Active,
    Revoked,
}

/// Engine-side bookkeeping for an issued secret
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaseRecord {
    pub secret: IssuedSecret,
    pub state: LeaseState,

    /// TTL applied on each renewal, in seconds
    pub ttl_secs: u64,

    pub expires_at: DateTime<Utc>,

    /// Hard cap; renewals never push `expires_at` past it
    pub max_expires_at: DateTime<Utc>,

    pub renewals: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revoked_at: Option<DateTime<Utc>>,
}

impl LeaseRecord {
    /// Open an active lease for a freshly issued secret
    ///
    /// `ttl` is clamped to `max_ttl`.
    pub fn new(secret: IssuedSecret, ttl_secs: u64, max_ttl_secs: u64) -> Self {
        let ttl_secs = ttl_secs.min(max_ttl_secs);
        let issued_at = secret.issued_at;
        Self {
            secret,
            state: LeaseState::Active,
            ttl_secs,
            expires_at: add_secs(issued_at, ttl_secs),
            max_expires_at: add_secs(issued_at, max_ttl_secs),
            renewals: 0,
            revoked_at: None,
        }
    }

    pub fn lease_id(&self) -> LeaseId {
        self.secret.lease_id
    }

    pub fn is_revoked(&self) -> bool {
        self.state == LeaseState::Revoked
    }

    /// Whether a presented secret is exactly the one this lease was opened for
    pub fn matches(&self, presented: &IssuedSecret) -> bool {
        self.secret == *presented
    }

    /// Extend the lease
    ///
    /// Returns the new expiry, `min(now + ttl, max_expires_at)`. Revoked leases
    /// fail with `AlreadyRevoked`; leases that reached their maximum TTL fail
    /// with `LeaseExpired`. A lease past `expires_at` but still under the
    /// maximum is renewable. The secret is never modified.
    pub fn renew(&mut self, now: DateTime<Utc>) -> Result<DateTime<Utc>> {
        let lease_id = self.lease_id().to_string();
        if self.is_revoked() {
            return Err(EngineError::AlreadyRevoked(lease_id));
        }
        if now >= self.max_expires_at {
            return Err(EngineError::LeaseExpired(lease_id));
        }

        let expires_at = add_secs(now, self.ttl_secs).min(self.max_expires_at);
        self.expires_at = expires_at;
        self.renewals = self.renewals.saturating_add(1);
        Ok(expires_at)
    }

    /// Terminate the lease
    ///
    /// Returns `true` on the Active → Revoked transition and `false` when the
    /// lease was already revoked (no-op).
    pub fn revoke(&mut self, now: DateTime<Utc>) -> bool {
        if self.is_revoked() {
            return false;
        }
        self.state = LeaseState::Revoked;
        self.revoked_at = Some(now);
        true
    }

    /// Remaining validity in whole seconds (0 once expired or revoked)
    pub fn remaining_secs(&self, now: DateTime<Utc>) -> u64 {
        if self.is_revoked() {
            return 0;
        }
        (self.expires_at - now).num_seconds().max(0) as u64
    }

    /// Non-secret view for operators
    pub fn view(&self) -> LeaseView {
        LeaseView {
            lease_id: self.lease_id(),
            role: self.secret.role.clone(),
            scope: self.secret.scope.clone(),
            state: self.state,
            issued_at: self.secret.issued_at,
            expires_at: self.expires_at,
            max_expires_at: self.max_expires_at,
            renewals: self.renewals,
            revoked_at: self.revoked_at,
        }
    }
}

/// Lease metadata without the token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaseView {
    pub lease_id: LeaseId,
    pub role: String,
    pub scope: RoleScope,
    pub state: LeaseState,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub max_expires_at: DateTime<Utc>,
    pub renewals: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revoked_at: Option<DateTime<Utc>>,
}

fn add_secs(at: DateTime<Utc>, secs: u64) -> DateTime<Utc> {
    i64::try_from(secs)
        .ok()
        .and_then(Duration::try_seconds)
        .and_then(|d| at.checked_add_signed(d))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}
