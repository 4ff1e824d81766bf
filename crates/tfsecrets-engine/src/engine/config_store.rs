//! Trust-anchor configuration

use tracing::{debug, info};

use tfsecrets_core::{ConfigView, EngineError, Result, UpstreamConfig};

use super::Engine;
use crate::storage::{get_json, put_json, CONFIG_KEY};

impl Engine {
    /// Write the trust-anchor configuration, replacing any previous one
    ///
    /// The token is validated and stored but never echoed back.
    pub async fn set_config(&self, token: String, address: Option<String>) -> Result<ConfigView> {
        let config = UpstreamConfig::new(token, address)?;
        put_json(self.store.as_ref(), CONFIG_KEY, &config).await?;

        info!(address = %config.address, "Upstream configuration written");
        Ok(config.view())
    }

    /// Externally readable configuration (no token)
    pub async fn read_config(&self) -> Result<Option<ConfigView>> {
        let config: Option<UpstreamConfig> = get_json(self.store.as_ref(), CONFIG_KEY).await?;
        Ok(config.map(|c| c.view()))
    }

    /// Remove the configuration; returns whether one existed
    pub async fn delete_config(&self) -> Result<bool> {
        let existed = self.store.delete(CONFIG_KEY).await?;
        if existed {
            info!("Upstream configuration deleted");
        }
        Ok(existed)
    }

    /// Full configuration including the trust-anchor token
    pub(crate) async fn trust_anchor(&self) -> Result<UpstreamConfig> {
        let config: Option<UpstreamConfig> = get_json(self.store.as_ref(), CONFIG_KEY).await?;
        config.ok_or_else(|| {
            debug!("Issuance attempted without configuration");
            EngineError::ConfigurationMissing
        })
    }
}
