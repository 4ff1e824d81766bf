//! Upstream Token Providers
//!
//! The secrets engine never talks HTTP itself: it asks a [`TokenProvider`] to
//! mint (and optionally delete) a scoped API token using the configured trust
//! anchor.
//!
//! ## Providers
//!
//! - **Terraform Cloud**: calls the organization / team authentication-token
//!   endpoints of the Terraform Cloud (or Terraform Enterprise) API v2
//! - **Mock**: mints unique fake tokens in memory and records every call, for
//!   tests and local development
//!
//! ## Usage
//!
//! ```ignore
//! use tfsecrets_upstream::{providers::TerraformCloudProvider, TokenProvider, TokenRequest};
//!
//! let provider = TerraformCloudProvider::new(Duration::from_secs(30))?;
//! let minted = provider.create_token(&TokenRequest::new(&config, scope)).await?;
//! println!("token id: {:?}", minted.token_id);
//! ```

pub mod error;
pub mod provider;
pub mod providers;
pub mod types;

pub use error::{Result, UpstreamError};
pub use provider::TokenProvider;
pub use types::{MintedToken, TokenRequest};
