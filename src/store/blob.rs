//! Blob store for avatar images

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use tracing::debug;

use super::validate_path;
use crate::error::{StoreError, StoreResult};

/// Trait for binary object storage
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store `bytes` at `path`, replacing any previous object, and return a retrievable URL
    async fn upload(&self, path: &str, bytes: Vec<u8>) -> StoreResult<String>;
}

/// In-memory blob store
pub struct InMemoryBlobStore {
    blobs: DashMap<String, Vec<u8>>,
    online: AtomicBool,
}

impl InMemoryBlobStore {
    pub fn new() -> Self {
        Self {
            blobs: DashMap::new(),
            online: AtomicBool::new(true),
        }
    }

    /// Toggle simulated connectivity
    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
    }

    /// Fetch a stored object
    pub fn get(&self, path: &str) -> Option<Vec<u8>> {
        self.blobs.get(path).map(|b| b.clone())
    }
}

impl Default for InMemoryBlobStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BlobStore for InMemoryBlobStore {
    async fn upload(&self, path: &str, bytes: Vec<u8>) -> StoreResult<String> {
        validate_path(path)?;
        if !self.online.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(format!("upload to {path} rejected: offline")));
        }

        debug!("Stored {} bytes at {}", bytes.len(), path);
        self.blobs.insert(path.to_string(), bytes);
        Ok(format!("memory://{path}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_upload_replaces_and_returns_url() {
        let blobs = InMemoryBlobStore::new();
        let url = blobs.upload("avatar/u1", vec![1, 2, 3]).await.unwrap();
        assert_eq!(url, "memory://avatar/u1");

        blobs.upload("avatar/u1", vec![9]).await.unwrap();
        assert_eq!(blobs.get("avatar/u1"), Some(vec![9]));
    }

    #[tokio::test]
    async fn test_offline_upload_fails() {
        let blobs = InMemoryBlobStore::new();
        blobs.set_online(false);
        assert!(blobs.upload("avatar/u1", vec![1]).await.is_err());
        assert_eq!(blobs.get("avatar/u1"), None);
    }
}
