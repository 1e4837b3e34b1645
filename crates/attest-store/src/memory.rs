//! In-memory blob store
//!
//! Test fake for exercising the pipeline without touching disk or network.
//! Returned URLs use the `mem://` scheme so tests can assert on them.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use attest_core::Result;
use tokio::sync::RwLock;

use crate::BlobStore;

/// One stored blob with its content type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredBlob {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

/// Blob store keeping everything in process memory
#[derive(Debug, Clone, Default)]
pub struct MemoryBlobStore {
    blobs: Arc<RwLock<HashMap<String, StoredBlob>>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch a stored blob for assertions
    pub async fn blob(&self, key: &str) -> Option<StoredBlob> {
        self.blobs.read().await.get(key).cloned()
    }

    /// Number of blobs stored so far
    pub async fn len(&self) -> usize {
        self.blobs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.blobs.read().await.is_empty()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn put(&self, key: &str, bytes: &[u8], content_type: &str) -> Result<String> {
        self.blobs.write().await.insert(
            key.to_string(),
            StoredBlob {
                bytes: bytes.to_vec(),
                content_type: content_type.to_string(),
            },
        );
        Ok(format!("mem://{}", key))
    }
}
