//! Named cache stores.
//!
//! The platform cache API is modeled as the [`CacheStorage`] trait: named
//! key-value stores created by name, enumerated, deleted wholesale, and
//! holding request-to-response snapshot entries. Two backends are provided:
//!
//! - [`MemoryStore`] - in-process, used in tests and short-lived agents
//! - [`DiskStore`] - JSON files on disk, persists across restarts

pub mod disk;
pub mod memory;

pub use disk::DiskStore;
pub use memory::MemoryStore;

use async_trait::async_trait;

use crate::error::StoreError;
use crate::request::{RequestKey, StoredResponse};

/// Abstraction over the platform's named-store cache API.
///
/// Concurrent writes to the same key are permitted; the last write wins. No
/// locking or transaction discipline is imposed beyond what each backend
/// needs for its own consistency.
#[async_trait]
pub trait CacheStorage: Send + Sync {
    /// Open the named store, creating it if absent.
    async fn open(&self, name: &str) -> Result<(), StoreError>;

    /// Names of all existing stores.
    async fn keys(&self) -> Result<Vec<String>, StoreError>;

    /// Delete the named store and all of its entries. Returns `true` if the
    /// store existed.
    async fn delete(&self, name: &str) -> Result<bool, StoreError>;

    /// Write an entry into the named store, overwriting any prior entry for
    /// the same key.
    async fn put(
        &self,
        name: &str,
        key: &RequestKey,
        response: StoredResponse,
    ) -> Result<(), StoreError>;

    /// Look up an entry in the named store. A missing store is treated the
    /// same as a missing entry.
    async fn get(&self, name: &str, key: &RequestKey)
        -> Result<Option<StoredResponse>, StoreError>;
}
