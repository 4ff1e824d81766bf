//! Credential lifecycle engine
//!
//! The [`Engine`] owns the four logical components:
//!
//! - **Config store** (`config_store`): the trust-anchor credential
//! - **Role registry** (`roles`): named organization / team roles
//! - **Issuer** (`issuer`): mints upstream tokens and opens leases
//! - **Lease manager** (`leases`): renew and revoke
//!
//! Every operation completes or fails before returning. Operations on the same
//! lease are serialized through `LeaseLocks`; everything else may run
//! concurrently.

mod config_store;
mod issuer;
mod leases;
mod locks;
mod roles;

pub use issuer::LeasedSecret;
use locks::LeaseLocks;

use chrono::{DateTime, Utc};
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tfsecrets_core::Result;
use tfsecrets_upstream::{TokenProvider, UpstreamError};

use crate::storage::Storage;

/// Default lease TTL (1 hour)
pub const DEFAULT_TTL_SECS: u64 = 3_600;

/// Default maximum lease TTL (24 hours)
pub const DEFAULT_MAX_TTL_SECS: u64 = 86_400;

/// Default upstream call timeout
pub const DEFAULT_UPSTREAM_TIMEOUT: Duration = Duration::from_secs(30);

/// What revoking a lease does upstream
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RevocationMode {
    /// End the lease locally; the upstream token is left alone
    #[default]
    Local,
    /// Also delete the token upstream before ending the lease
    ///
    /// Terraform Cloud holds one token per organization or team, and minting
    /// replaces it. The delete therefore targets the scope's current token,
    /// which may belong to a later lease that stays active in the table.
    Upstream,
}

/// Engine-level settings
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// TTL for roles that do not set one, in seconds
    pub default_ttl: u64,
    /// Maximum TTL for roles that do not set one, in seconds
    pub max_ttl: u64,
    /// Upstream timeout used when the request does not carry one
    pub upstream_timeout: Duration,
    pub revocation: RevocationMode,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_ttl: DEFAULT_TTL_SECS,
            max_ttl: DEFAULT_MAX_TTL_SECS,
            upstream_timeout: DEFAULT_UPSTREAM_TIMEOUT,
            revocation: RevocationMode::Local,
        }
    }
}

/// Per-request execution context supplied by the router
#[derive(Debug, Clone, Copy)]
pub struct RequestContext {
    /// Upper bound for any upstream call made on behalf of this request
    pub timeout: Duration,
}

impl RequestContext {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

/// The secrets engine
pub struct Engine {
    store: Arc<dyn Storage>,
    provider: Arc<dyn TokenProvider>,
    config: EngineConfig,
    lease_locks: LeaseLocks,
}

impl Engine {
    pub fn new(
        store: Arc<dyn Storage>,
        provider: Arc<dyn TokenProvider>,
        config: EngineConfig,
    ) -> Self {
        Self {
            store,
            provider,
            config,
            lease_locks: LeaseLocks::new(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Context with the engine's default upstream timeout
    pub fn default_context(&self) -> RequestContext {
        RequestContext::new(self.config.upstream_timeout)
    }

    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Run an upstream call bounded by the request timeout
///
/// On expiry the call future is dropped, which aborts the in-flight request.
async fn bounded<T, F>(ctx: &RequestContext, call: F) -> Result<T>
where
    F: Future<Output = tfsecrets_upstream::Result<T>>,
{
    match tokio::time::timeout(ctx.timeout, call).await {
        Ok(result) => result.map_err(Into::into),
        Err(_) => Err(UpstreamError::Timeout(ctx.timeout).into()),
    }
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("store", &self.store)
            .field("provider", &self.provider.description())
            .field("config", &self.config)
            .finish()
    }
}
