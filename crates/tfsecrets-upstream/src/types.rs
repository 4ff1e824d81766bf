//! Request and response types exchanged with token providers

use serde::{Deserialize, Serialize};
use std::fmt;

use tfsecrets_core::{RoleScope, UpstreamConfig};

/// A request to mint or delete a scoped token
///
/// Carries the trust anchor by value so providers stay stateless with respect
/// to configuration: a config rewrite takes effect on the next request.
#[derive(Clone)]
pub struct TokenRequest {
    /// Upstream base URL
    pub address: String,

    /// Trust-anchor token used as the bearer credential
    pub trust_anchor: String,

    /// Organization or team the token is scoped to
    pub scope: RoleScope,
}

impl TokenRequest {
    pub fn new(config: &UpstreamConfig, scope: RoleScope) -> Self {
        Self {
            address: config.address.clone(),
            trust_anchor: config.token.clone(),
            scope,
        }
    }
}

impl fmt::Debug for TokenRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenRequest")
            .field("address", &self.address)
            .field("trust_anchor", &"<redacted>")
            .field("scope", &self.scope)
            .finish()
    }
}

/// A token minted by the upstream provider
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MintedToken {
    /// The API token itself
    pub token: String,

    /// Upstream identifier of the token
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_id: Option<String>,

    /// Organization the token belongs to
    pub organization: String,

    /// Team the token belongs to, for team tokens
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team_id: Option<String>,
}

impl MintedToken {
    /// Build a minted token for the given scope
    pub fn for_scope(token: impl Into<String>, scope: &RoleScope) -> Self {
        Self {
            token: token.into(),
            token_id: None,
            organization: scope.organization().to_string(),
            team_id: scope.team_id().map(str::to_string),
        }
    }

    /// Set the upstream token identifier
    pub fn with_token_id(mut self, token_id: impl Into<String>) -> Self {
        self.token_id = Some(token_id.into());
        self
    }
}

impl fmt::Debug for MintedToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MintedToken")
            .field("token", &"<redacted>")
            .field("token_id", &self.token_id)
            .field("organization", &self.organization)
            .field("team_id", &self.team_id)
            .finish()
    }
}
