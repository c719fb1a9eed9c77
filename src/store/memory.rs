//! In-memory cache store.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::StoreError;
use crate::request::{RequestKey, StoredResponse};

use super::CacheStorage;

/// An in-process [`CacheStorage`] backend.
///
/// Entries live for the lifetime of the value. Suitable as a substitute for
/// the platform store in tests, or as a real backend for agents that do not
/// need persistence across restarts.
#[derive(Debug, Default)]
pub struct MemoryStore {
    stores: RwLock<HashMap<String, HashMap<RequestKey, StoredResponse>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries in the named store, or `None` if it does not exist.
    pub async fn len(&self, name: &str) -> Option<usize> {
        self.stores.read().await.get(name).map(|s| s.len())
    }
}

#[async_trait]
impl CacheStorage for MemoryStore {
    async fn open(&self, name: &str) -> Result<(), StoreError> {
        self.stores
            .write()
            .await
            .entry(name.to_string())
            .or_default();
        Ok(())
    }

    async fn keys(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.stores.read().await.keys().cloned().collect())
    }

    async fn delete(&self, name: &str) -> Result<bool, StoreError> {
        Ok(self.stores.write().await.remove(name).is_some())
    }

    async fn put(
        &self,
        name: &str,
        key: &RequestKey,
        response: StoredResponse,
    ) -> Result<(), StoreError> {
        let mut stores = self.stores.write().await;
        let store = stores
            .get_mut(name)
            .ok_or_else(|| StoreError::NoSuchStore(name.to_string()))?;
        store.insert(key.clone(), response);
        Ok(())
    }

    async fn get(
        &self,
        name: &str,
        key: &RequestKey,
    ) -> Result<Option<StoredResponse>, StoreError> {
        Ok(self
            .stores
            .read()
            .await
            .get(name)
            .and_then(|s| s.get(key))
            .cloned())
    }
}
