//! Record sinks
//!
//! The pipeline returns its records; pushing them into a sink is a separate
//! call by the orchestrator. Sinks are append-only: rows are only ever added,
//! never rewritten.

use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use attest_core::{AttestError, Result, TabularRecord};
use tokio::fs;
use tokio::sync::RwLock;
use tracing::debug;

/// Append-only tabular store the projected records flow into
#[async_trait]
pub trait RecordSink: Send + Sync {
    /// Append a batch of records. Safe to call repeatedly within one run.
    async fn append_records(&self, records: &[TabularRecord]) -> Result<()>;
}

/// Sink appending one JSON line per record to a local file
#[derive(Debug, Clone)]
pub struct JsonlSink {
    path: PathBuf,
}

impl JsonlSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Read every record appended so far
    pub async fn load_all(&self) -> Result<Vec<TabularRecord>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(&self.path).await?;
        let mut records = Vec::new();
        for line in content.lines() {
            if line.is_empty() {
                continue;
            }
            records.push(serde_json::from_str(line)?);
        }
        Ok(records)
    }
}

#[async_trait]
impl RecordSink for JsonlSink {
    async fn append_records(&self, records: &[TabularRecord]) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }

        // Ensure directory exists
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }

        use tokio::io::AsyncWriteExt;
        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| {
                AttestError::RecordSink(format!("Failed to open {}: {}", self.path.display(), e))
            })?;

        for record in records {
            let line = serde_json::to_string(record)?;
            file.write_all(line.as_bytes()).await.map_err(|e| {
                AttestError::RecordSink(format!("Failed to append to {}: {}", self.path.display(), e))
            })?;
            file.write_all(b"\n").await.map_err(|e| {
                AttestError::RecordSink(format!("Failed to append to {}: {}", self.path.display(), e))
            })?;
        }

        debug!("Appended {} records to {:?}", records.len(), self.path);
        Ok(())
    }
}

/// In-memory sink for tests
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    records: Arc<RwLock<VecDeque<TabularRecord>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every record appended so far, in append order
    pub async fn records(&self) -> Vec<TabularRecord> {
        self.records.read().await.iter().cloned().collect()
    }
}

#[async_trait]
impl RecordSink for MemorySink {
    async fn append_records(&self, records: &[TabularRecord]) -> Result<()> {
        self.records.write().await.extend(records.iter().cloned());
        Ok(())
    }
}
