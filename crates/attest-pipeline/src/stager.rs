//! Concurrent artifact staging
//!
//! One upload task per artifact, all spawned up front and all awaited before
//! returning: a fan-out/fan-in barrier. No ordering holds between uploads.
//! Failures are isolated per key: a missing file or a store rejection never
//! aborts sibling uploads, and every failing key is surfaced to the caller.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use attest_core::{
    ArtifactKey, AttachmentSource, AttestError, Result, UploadWarning, UploadedArtifact,
};
use attest_report::ArtifactPlan;
use attest_store::BlobStore;
use tokio::time::timeout;
use tracing::{debug, warn};

/// Everything the stage phase produced: the frozen key→artifact map handed to
/// the projector, and one warning per upload that did not make it
#[derive(Debug)]
pub struct StageOutcome {
    pub uploaded: HashMap<ArtifactKey, UploadedArtifact>,
    pub failures: Vec<UploadWarning>,
}

/// Uploads planned artifacts into a blob store
pub struct ArtifactStager {
    store: Arc<dyn BlobStore>,
    /// Directory file-backed attachment paths are resolved against
    working_dir: PathBuf,
    /// Per-upload budget; an expired upload is failed for its key
    upload_timeout: Duration,
}

impl ArtifactStager {
    pub fn new(
        store: Arc<dyn BlobStore>,
        working_dir: impl Into<PathBuf>,
        upload_timeout: Duration,
    ) -> Self {
        Self {
            store,
            working_dir: working_dir.into(),
            upload_timeout,
        }
    }

    /// Upload every planned artifact, concurrently, and await all of them.
    ///
    /// The returned map is complete when this returns: no upload task is
    /// still in flight, so the projector's join is well-defined.
    pub async fn stage(&self, plans: Vec<ArtifactPlan>) -> StageOutcome {
        debug!("Staging {} artifacts", plans.len());

        let mut handles = Vec::with_capacity(plans.len());
        for plan in plans {
            let key = plan.key.clone();
            let store = Arc::clone(&self.store);
            let working_dir = self.working_dir.clone();
            let budget = self.upload_timeout;

            let timeout_key = key.clone();
            let handle = tokio::spawn(async move {
                match timeout(budget, upload_one(store, working_dir, plan)).await {
                    Ok(result) => result,
                    Err(_) => Err(AttestError::ArtifactUpload {
                        key: timeout_key.to_string(),
                        reason: format!("timed out after {}s", budget.as_secs()),
                    }),
                }
            });
            handles.push((key, handle));
        }

        // Fan-in barrier: every task settles before the map is frozen
        let mut uploaded = HashMap::new();
        let mut failures = Vec::new();
        for (key, handle) in handles {
            match handle.await {
                Ok(Ok(artifact)) => {
                    uploaded.insert(artifact.key.clone(), artifact);
                }
                Ok(Err(e)) => {
                    warn!("Artifact {} not staged: {}", key, e);
                    failures.push(UploadWarning::new(key, e.to_string()));
                }
                Err(e) => {
                    warn!("Upload task for {} died: {}", key, e);
                    failures.push(UploadWarning::new(key, format!("upload task failed: {}", e)));
                }
            }
        }

        debug!(
            "Staged {} artifacts, {} failures",
            uploaded.len(),
            failures.len()
        );
        StageOutcome { uploaded, failures }
    }
}

/// Resolve one artifact's bytes and push them into the store
async fn upload_one(
    store: Arc<dyn BlobStore>,
    working_dir: PathBuf,
    plan: ArtifactPlan,
) -> Result<UploadedArtifact> {
    let bytes = match plan.source {
        AttachmentSource::Inline(bytes) => bytes,
        AttachmentSource::File(path) => {
            let full_path = working_dir.join(&path);
            tokio::fs::read(&full_path)
                .await
                .map_err(|e| AttestError::ByteSourceRead {
                    key: plan.key.to_string(),
                    reason: format!("{}: {}", full_path.display(), e),
                })?
        }
    };

    let url = store
        .put(plan.key.as_str(), &bytes, &plan.content_type)
        .await
        .map_err(|e| AttestError::ArtifactUpload {
            key: plan.key.to_string(),
            reason: e.to_string(),
        })?;

    Ok(UploadedArtifact {
        key: plan.key,
        url,
        content_type: plan.content_type,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use attest_store::MemoryBlobStore;
    use tempfile::TempDir;

    fn plan(key: &str, source: AttachmentSource) -> ArtifactPlan {
        ArtifactPlan {
            key: ArtifactKey::new(key),
            name: key.rsplit('/').next().unwrap_or(key).to_string(),
            content_type: "application/octet-stream".to_string(),
            source,
        }
    }

    fn stager(store: Arc<dyn BlobStore>, working_dir: &std::path::Path) -> ArtifactStager {
        ArtifactStager::new(store, working_dir, Duration::from_secs(5))
    }

    #[tokio::test]
    async fn test_stage_uploads_inline_and_file_sources() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("shot.png"), b"pngdata").unwrap();

        let store = Arc::new(MemoryBlobStore::new());
        let outcome = stager(store.clone(), temp_dir.path())
            .stage(vec![
                plan("a/shot.png", AttachmentSource::File("shot.png".into())),
                plan("a/log.txt", AttachmentSource::Inline(b"hello".to_vec())),
            ])
            .await;

        assert!(outcome.failures.is_empty());
        assert_eq!(outcome.uploaded.len(), 2);
        assert_eq!(store.blob("a/shot.png").await.unwrap().bytes, b"pngdata");
        assert_eq!(store.blob("a/log.txt").await.unwrap().bytes, b"hello");
    }

    #[tokio::test]
    async fn test_missing_file_fails_only_its_key() {
        let temp_dir = TempDir::new().unwrap();
        let store = Arc::new(MemoryBlobStore::new());

        let outcome = stager(store.clone(), temp_dir.path())
            .stage(vec![
                plan("a/gone.webm", AttachmentSource::File("gone.webm".into())),
                plan("a/kept.txt", AttachmentSource::Inline(b"kept".to_vec())),
            ])
            .await;

        assert_eq!(outcome.uploaded.len(), 1);
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].key, ArtifactKey::new("a/gone.webm"));
        assert!(outcome.failures[0].reason.contains("unreadable"));
    }

    /// Store that never finishes a put
    struct HangingStore;

    #[async_trait]
    impl BlobStore for HangingStore {
        async fn put(&self, _key: &str, _bytes: &[u8], _content_type: &str) -> Result<String> {
            tokio::time::sleep(Duration::from_secs(600)).await;
            Ok(String::new())
        }
    }

    #[tokio::test]
    async fn test_timeout_bounds_the_fan_in_wait() {
        let temp_dir = TempDir::new().unwrap();
        let stager = ArtifactStager::new(
            Arc::new(HangingStore),
            temp_dir.path(),
            Duration::from_millis(50),
        );

        let outcome = stager
            .stage(vec![plan("a/slow.zip", AttachmentSource::Inline(vec![0]))])
            .await;

        assert!(outcome.uploaded.is_empty());
        assert_eq!(outcome.failures.len(), 1);
        assert!(outcome.failures[0].reason.contains("timed out"));
    }

    #[tokio::test]
    async fn test_stage_empty_plan_list() {
        let temp_dir = TempDir::new().unwrap();
        let store = Arc::new(MemoryBlobStore::new());
        let outcome = stager(store.clone(), temp_dir.path()).stage(Vec::new()).await;

        assert!(outcome.uploaded.is_empty());
        assert!(outcome.failures.is_empty());
        assert!(store.is_empty().await);
    }
}
