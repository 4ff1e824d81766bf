//! # tfsecrets core
//!
//! Domain types for a secrets engine that brokers short-lived Terraform Cloud
//! API tokens.
//!
//! ## Key Concepts
//!
//! - **Trust anchor**: the administrative token the engine uses to mint
//!   credentials upstream ([`UpstreamConfig`])
//! - **Role**: a named policy scoping issued tokens to an organization or a team
//!   ([`Role`], [`RoleScope`])
//! - **Issued secret**: the token handed to a consumer, together with its lease
//!   handle ([`IssuedSecret`])
//! - **Lease**: the engine's bookkeeping for an issued secret ([`LeaseRecord`])
//!
//! ## Lease Invariants
//!
//! 1. **Stability**: renewing a secret never changes its token or lease id
//! 2. **Finality**: a revoked lease can never become active again
//! 3. **Idempotence**: revoking an already revoked lease is a no-op

pub mod config;
pub mod error;
pub mod lease;
pub mod role;

pub use config::{ConfigView, UpstreamConfig, DEFAULT_ADDRESS};
pub use error::{EngineError, Result};
pub use lease::{IssuedSecret, LeaseId, LeaseRecord, LeaseState, LeaseView};
pub use role::{Role, RoleKind, RoleScope};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
