//! Secrets Engine Server Binary
//!
//! Runs the Terraform token secrets engine over HTTP.

use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::FmtSubscriber;

use tfsecrets_engine::{
    create_router, AppState, Engine, MemoryStore, ProviderKind, ServerConfig, Storage,
};
use tfsecrets_upstream::providers::{MockProvider, TerraformCloudProvider};
use tfsecrets_upstream::TokenProvider;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = ServerConfig::from_env()?;

    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.log_level)
        .with_target(true)
        .with_thread_ids(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let store = open_store(&config).await?;

    let provider: Arc<dyn TokenProvider> = match config.provider {
        ProviderKind::Terraform => Arc::new(TerraformCloudProvider::new(
            config.engine.upstream_timeout,
        )?),
        ProviderKind::Mock => {
            warn!("Using mock token provider: issued tokens are not valid upstream");
            Arc::new(MockProvider::new())
        }
    };

    info!(
        port = config.port,
        provider = %provider.description(),
        revocation = ?config.engine.revocation,
        default_ttl = config.engine.default_ttl,
        max_ttl = config.engine.max_ttl,
        "Starting secrets engine"
    );

    let engine = Engine::new(store, provider, config.engine.clone());
    let app = create_router(Arc::new(AppState::new(engine)));

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!(addr = %addr, "Secrets engine listening");

    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(feature = "postgres")]
async fn open_store(config: &ServerConfig) -> Result<Arc<dyn Storage>, Box<dyn std::error::Error>> {
    match &config.database_url {
        Some(url) => Ok(Arc::new(
            tfsecrets_engine::storage::PostgresStore::new(url).await?,
        )),
        None => {
            warn!("TFSECRETS_DATABASE_URL not set, using in-memory storage");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}

#[cfg(not(feature = "postgres"))]
async fn open_store(config: &ServerConfig) -> Result<Arc<dyn Storage>, Box<dyn std::error::Error>> {
    if config.database_url.is_some() {
        warn!("TFSECRETS_DATABASE_URL ignored: built without the postgres feature");
    }
    Ok(Arc::new(MemoryStore::new()))
}
