//! Filesystem blob store
//!
//! Writes each blob under `base_dir/<key>`, creating intermediate directories
//! as needed (keys are hierarchical and contain `/`). The returned URL is a
//! `file://` URL of the absolute blob path.

use std::path::PathBuf;

use async_trait::async_trait;
use attest_core::{AttestError, Result};
use tokio::fs;
use tracing::debug;

use crate::BlobStore;

/// Blob store backed by a local artifact directory
#[derive(Debug, Clone)]
pub struct FsBlobStore {
    base_dir: PathBuf,
}

impl FsBlobStore {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }
}

#[async_trait]
impl BlobStore for FsBlobStore {
    async fn put(&self, key: &str, bytes: &[u8], content_type: &str) -> Result<String> {
        let blob_path = self.base_dir.join(key);

        if let Some(parent) = blob_path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| {
                AttestError::BlobStore(format!(
                    "Failed to create blob directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        fs::write(&blob_path, bytes).await.map_err(|e| {
            AttestError::BlobStore(format!("Failed to write blob {}: {}", blob_path.display(), e))
        })?;

        let absolute = fs::canonicalize(&blob_path).await.map_err(|e| {
            AttestError::BlobStore(format!(
                "Failed to resolve blob path {}: {}",
                blob_path.display(),
                e
            ))
        })?;

        debug!(
            "Stored blob {} ({} bytes, {})",
            absolute.display(),
            bytes.len(),
            content_type
        );

        Ok(format!("file://{}", absolute.display()))
    }
}
