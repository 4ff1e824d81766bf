//! Token provider abstraction

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{MintedToken, TokenRequest};

/// Trait for upstream token providers
///
/// Each call is independent: providers must not cache or share minted tokens
/// between requests, because every issued token is a separately revocable
/// upstream artifact.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// Mint a new token scoped to `request.scope`
    ///
    /// # Returns
    /// * `Ok(MintedToken)` - The new token and its upstream identifiers
    /// * `Err(UpstreamError)` - Any transport failure or non-success status
    async fn create_token(&self, request: &TokenRequest) -> Result<MintedToken>;

    /// Delete the token currently held for `request.scope`
    async fn revoke_token(&self, request: &TokenRequest) -> Result<()>;

    /// Get a description of this provider (for logging)
    fn description(&self) -> &str {
        "token provider"
    }
}
