//! Storage abstraction for the secrets engine
//!
//! The engine persists three kinds of records through a plain key/value
//! interface, each JSON-encoded:
//!
//! - `config` - the trust-anchor configuration (singleton)
//! - `role/<name>` - role definitions
//! - `lease/<lease_id>` - lease records, including revoked tombstones
//!
//! Every engine write is a single `put` of one record, so backends only need
//! per-key atomicity.

pub mod memory;
#[cfg(feature = "postgres")]
pub mod postgres;

pub use memory::MemoryStore;
#[cfg(feature = "postgres")]
pub use postgres::PostgresStore;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use std::fmt::Debug;

use tfsecrets_core::EngineError;

/// Key of the configuration record
pub const CONFIG_KEY: &str = "config";

/// Prefix of role records
pub const ROLE_PREFIX: &str = "role/";

/// Prefix of lease records
pub const LEASE_PREFIX: &str = "lease/";

/// Error type for storage operations
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Storage lock poisoned")]
    Poisoned,
}

impl From<StorageError> for EngineError {
    fn from(err: StorageError) -> Self {
        EngineError::Storage(err.to_string())
    }
}

/// Key/value storage backend
///
/// Implementations must be thread-safe and support concurrent access.
#[async_trait]
pub trait Storage: Send + Sync + Debug {
    /// Fetch the value stored under `key`
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError>;

    /// Store `value` under `key`, replacing any previous value
    async fn put(&self, key: &str, value: Vec<u8>) -> Result<(), StorageError>;

    /// Remove `key`; returns whether it existed
    async fn delete(&self, key: &str) -> Result<bool, StorageError>;

    /// List keys starting with `prefix`, with the prefix stripped, sorted
    async fn list(&self, prefix: &str) -> Result<Vec<String>, StorageError>;
}

/// Fetch and decode a JSON record
pub(crate) async fn get_json<T: DeserializeOwned>(
    store: &dyn Storage,
    key: &str,
) -> Result<Option<T>, EngineError> {
    match store.get(key).await? {
        Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
        None => Ok(None),
    }
}

/// Encode and store a JSON record
pub(crate) async fn put_json<T: Serialize>(
    store: &dyn Storage,
    key: &str,
    value: &T,
) -> Result<(), EngineError> {
    let bytes = serde_json::to_vec(value)?;
    store.put(key, bytes).await?;
    Ok(())
}
