//! Disk-backed cache store.
//!
//! Each named store is a directory under the root; each entry is a JSON file
//! named by a digest of its key. Contents persist across restarts until the
//! owning store is deleted wholesale.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::error::StoreError;
use crate::request::{RequestKey, StoredResponse};

use super::CacheStorage;

/// Application name used for the default store directory.
const APP_NAME: &str = "cacheworker";

/// Entry file layout: the key is stored alongside the response so files are
/// self-describing and digest collisions are detectable.
#[derive(Debug, Serialize, Deserialize)]
struct DiskEntry {
    key: RequestKey,
    response: StoredResponse,
}

/// A [`CacheStorage`] backend writing JSON files under a root directory.
#[derive(Debug)]
pub struct DiskStore {
    root: PathBuf,
}

impl DiskStore {
    /// Open a store rooted at the given directory, creating it if needed.
    pub fn new(root: PathBuf) -> Result<Self, StoreError> {
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// Open a store under the platform cache directory
    /// (e.g. `~/.cache/cacheworker`).
    pub fn in_default_dir() -> Result<Self, StoreError> {
        let base = dirs::cache_dir().ok_or_else(|| {
            StoreError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "could not determine platform cache directory",
            ))
        })?;
        Self::new(base.join(APP_NAME))
    }

    fn store_dir(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    fn entry_path(&self, name: &str, key: &RequestKey) -> PathBuf {
        self.store_dir(name).join(format!("{}.json", digest(key)))
    }

    fn read_entry(path: &Path) -> Result<DiskEntry, StoreError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }
}

/// Filename-safe digest of a request key.
fn digest(key: &RequestKey) -> String {
    let mut hasher = Sha256::new();
    hasher.update(key.to_string().as_bytes());
    let hash = hasher.finalize();
    // 16 bytes of the digest is plenty for uniqueness at manifest scale
    hash[..16].iter().map(|b| format!("{:02x}", b)).collect()
}

#[async_trait]
impl CacheStorage for DiskStore {
    async fn open(&self, name: &str) -> Result<(), StoreError> {
        std::fs::create_dir_all(self.store_dir(name))?;
        Ok(())
    }

    async fn keys(&self) -> Result<Vec<String>, StoreError> {
        let mut names = Vec::new();
        for entry in std::fs::read_dir(&self.root)? {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        Ok(names)
    }

    async fn delete(&self, name: &str) -> Result<bool, StoreError> {
        let dir = self.store_dir(name);
        if !dir.exists() {
            return Ok(false);
        }
        std::fs::remove_dir_all(&dir)?;
        debug!(store = name, "Deleted disk store");
        Ok(true)
    }

    async fn put(
        &self,
        name: &str,
        key: &RequestKey,
        response: StoredResponse,
    ) -> Result<(), StoreError> {
        let dir = self.store_dir(name);
        if !dir.exists() {
            return Err(StoreError::NoSuchStore(name.to_string()));
        }
        let entry = DiskEntry {
            key: key.clone(),
            response,
        };
        let contents = serde_json::to_string(&entry)?;
        std::fs::write(self.entry_path(name, key), contents)?;
        Ok(())
    }

    async fn get(
        &self,
        name: &str,
        key: &RequestKey,
    ) -> Result<Option<StoredResponse>, StoreError> {
        let path = self.entry_path(name, key);
        if !path.exists() {
            return Ok(None);
        }
        let entry = Self::read_entry(&path)?;
        if entry.key != *key {
            // Digest collision; treat as a miss rather than serving the
            // wrong snapshot
            debug!(stored = %entry.key, requested = %key, "Digest collision on disk entry");
            return Ok(None);
        }
        Ok(Some(entry.response))
    }
}
