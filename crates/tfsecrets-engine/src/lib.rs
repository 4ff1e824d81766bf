//! Terraform Token Secrets Engine
//!
//! Brokers short-lived Terraform Cloud API tokens:
//! - Stores the upstream trust-anchor token (`config`)
//! - Keeps named organization / team roles (`roles/<name>`)
//! - Mints a fresh scoped token on every read of `creds/<name>` and opens a
//!   lease for it
//! - Renews and revokes leases against the exact secret that was issued
//!
//! ## Lease invariants
//!
//! 1. **STABILITY**: renewal returns the same token and lease handle
//! 2. **FINALITY**: a revoked lease is never renewable again
//! 3. **IDEMPOTENCE**: revoking twice is not an error
//!
//! ## API Endpoints
//!
//! - `GET /health` - Liveness check
//! - `POST|GET|DELETE /v1/config` - Trust-anchor configuration
//! - `GET /v1/roles` - List role names
//! - `POST|GET|DELETE /v1/roles/{name}` - Role definitions
//! - `GET /v1/creds/{name}` - Issue a credential
//! - `POST /v1/leases/renew` - Renew a lease (body: the issued secret)
//! - `POST /v1/leases/revoke` - Revoke a lease (body: the issued secret)
//! - `GET /v1/leases/{lease_id}` - Lease metadata

pub mod api;
pub mod config;
pub mod engine;
pub mod storage;

pub use api::create_router;
pub use api::handlers::AppState;
pub use config::{ConfigError, ProviderKind, ServerConfig};
pub use engine::{Engine, EngineConfig, LeasedSecret, RequestContext, RevocationMode};
pub use storage::{MemoryStore, Storage, StorageError};
