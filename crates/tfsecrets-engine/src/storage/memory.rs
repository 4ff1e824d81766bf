//! In-memory storage backend
//!
//! Default storage implementation using an ordered in-memory map.
//! Suitable for development and single-instance deployments.
//! Data is lost on restart.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::RwLock;
use tracing::debug;

use super::{Storage, StorageError};

/// In-memory key/value store
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<BTreeMap<String, Vec<u8>>>,
}

impl MemoryStore {
    /// Create a new in-memory store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries
    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl Storage for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        let entries = self.entries.read().map_err(|_| StorageError::Poisoned)?;
        Ok(entries.get(key).cloned())
    }

    async fn put(&self, key: &str, value: Vec<u8>) -> Result<(), StorageError> {
        let mut entries = self.entries.write().map_err(|_| StorageError::Poisoned)?;
        debug!(key = %key, bytes = value.len(), "Storing entry");
        entries.insert(key.to_string(), value);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool, StorageError> {
        let mut entries = self.entries.write().map_err(|_| StorageError::Poisoned)?;
        let removed = entries.remove(key).is_some();
        if removed {
            debug!(key = %key, "Deleted entry");
        }
        Ok(removed)
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
        let entries = self.entries.read().map_err(|_| StorageError::Poisoned)?;
        Ok(entries
            .range(prefix.to_string()..)
            .take_while(|(k, _)| k.starts_with(prefix))
            .map(|(k, _)| k[prefix.len()..].to_string())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_get_delete() {
        let store = MemoryStore::new();

        store.put("config", b"{}".to_vec()).await.unwrap();
        assert_eq!(store.get("config").await.unwrap(), Some(b"{}".to_vec()));

        assert!(store.delete("config").await.unwrap());
        assert!(!store.delete("config").await.unwrap());
        assert_eq!(store.get("config").await.unwrap(), None);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_put_replaces() {
        let store = MemoryStore::new();

        store.put("role/a", b"1".to_vec()).await.unwrap();
        store.put("role/a", b"2".to_vec()).await.unwrap();

        assert_eq!(store.get("role/a").await.unwrap(), Some(b"2".to_vec()));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_list_by_prefix() {
        let store = MemoryStore::new();

        store.put("role/beta", vec![]).await.unwrap();
        store.put("role/alpha", vec![]).await.unwrap();
        store.put("lease/123", vec![]).await.unwrap();
        store.put("roles", vec![]).await.unwrap();

        let roles = store.list("role/").await.unwrap();
        assert_eq!(roles, vec!["alpha".to_string(), "beta".to_string()]);

        let leases = store.list("lease/").await.unwrap();
        assert_eq!(leases, vec!["123".to_string()]);
    }
}
