//! Upstream trust-anchor configuration

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{EngineError, Result};

/// Default Terraform Cloud API address
pub const DEFAULT_ADDRESS: &str = "https://app.terraform.io";

/// The singleton configuration record
///
/// Holds the administrative API token used to mint scoped tokens upstream.
/// The token never leaves the engine: it is not returned by reads and is
/// redacted from `Debug` output.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// Trust-anchor API token
    pub token: String,

    /// Base URL of the upstream API
    #[serde(default = "default_address")]
    pub address: String,
}

fn default_address() -> String {
    DEFAULT_ADDRESS.to_string()
}

impl UpstreamConfig {
    /// Build a validated configuration
    ///
    /// The token must be non-empty. A missing or blank address falls back to
    /// [`DEFAULT_ADDRESS`].
    pub fn new(token: impl Into<String>, address: Option<String>) -> Result<Self> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(EngineError::validation("token must not be empty"));
        }

        let address = match address {
            Some(a) if !a.trim().is_empty() => {
                let a = a.trim().trim_end_matches('/').to_string();
                if !(a.starts_with("http://") || a.starts_with("https://")) {
                    return Err(EngineError::validation(format!(
                        "address must be an http(s) URL, got '{}'",
                        a
                    )));
                }
                a
            }
            _ => default_address(),
        };

        Ok(Self { token, address })
    }

    /// Externally readable view (no token)
    pub fn view(&self) -> ConfigView {
        ConfigView {
            address: self.address.clone(),
            token_set: !self.token.is_empty(),
        }
    }
}

impl fmt::Debug for UpstreamConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpstreamConfig")
            .field("token", &"<redacted>")
            .field("address", &self.address)
            .finish()
    }
}

/// Read view of the configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigView {
    pub address: String,
    pub token_set: bool,
}
