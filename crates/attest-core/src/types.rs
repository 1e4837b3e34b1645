//! Core type definitions for the evidence pipeline

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Final status of one test attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TestStatus {
    Passed,
    Failed,
    TimedOut,
    Skipped,
    Interrupted,
}

impl TestStatus {
    /// Whether this attempt counts as a failure for summary purposes
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed | Self::TimedOut | Self::Interrupted)
    }
}

impl std::fmt::Display for TestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Passed => write!(f, "passed"),
            Self::Failed => write!(f, "failed"),
            Self::TimedOut => write!(f, "timedOut"),
            Self::Skipped => write!(f, "skipped"),
            Self::Interrupted => write!(f, "interrupted"),
        }
    }
}

impl std::str::FromStr for TestStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "passed" => Ok(Self::Passed),
            "failed" => Ok(Self::Failed),
            "timedOut" | "timedout" => Ok(Self::TimedOut),
            "skipped" => Ok(Self::Skipped),
            "interrupted" => Ok(Self::Interrupted),
            _ => Err(format!("Invalid test status: {}", s)),
        }
    }
}

/// Where an attachment's bytes come from
///
/// Exactly one form exists per attachment: either a path relative to the run's
/// working directory (read lazily at stage time) or the bytes themselves
/// (already decoded from the report body).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttachmentSource {
    /// Relative path into the run's working directory
    File(PathBuf),
    /// Bytes carried inline by the report
    Inline(Vec<u8>),
}

/// One attachment descriptor as captured during a test attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawAttachment {
    /// Attachment name as recorded by the runner (e.g. "screenshot.png")
    pub name: String,
    /// Content type declared by the runner, if any
    pub content_type: Option<String>,
    /// Byte source for the attachment
    pub source: AttachmentSource,
}

/// One flattened leaf test attempt
///
/// Produced once per (test case, attempt) pair by the report walker; immutable
/// after creation and owned exclusively by the pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestOutcome {
    /// Ancestor suite titles from root to the leaf's immediate parent
    pub suite_path: Vec<String>,
    /// Title of the spec the attempt belongs to
    pub spec_title: String,
    /// Project (browser/device profile) the attempt ran under
    pub project_name: String,
    /// 0 for the first attempt, incremented per retry of the same test case
    pub attempt_index: u32,
    /// Final status of the attempt
    pub status: TestStatus,
    /// Attempt duration in milliseconds
    pub duration_ms: u64,
    /// Error message for failed attempts
    pub error_message: Option<String>,
    /// Attachment descriptors in capture order
    pub attachments: Vec<RawAttachment>,
}

/// Deterministic storage address for one artifact
///
/// Derived from the owning outcome's identity plus the attachment name;
/// duplicate names within one outcome get an increasing `#2`, `#3`, … suffix
/// in encounter order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArtifactKey(String);

impl ArtifactKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ArtifactKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ArtifactKey {
    fn from(key: String) -> Self {
        Self(key)
    }
}

/// A successfully stored artifact
///
/// Exists only for the lifetime of a pipeline run; never persisted beyond the
/// final joined record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedArtifact {
    /// Key the blob was stored under
    pub key: ArtifactKey,
    /// Retrieval URL returned by the blob store
    pub url: String,
    /// Content type the blob was stored with
    pub content_type: String,
}

/// Sink-facing artifact entry on a tabular record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactLink {
    pub name: String,
    pub url: String,
    pub content_type: String,
}

/// One sink-ready row summarizing a single test attempt
///
/// Every artifact link carries a non-empty URL; a record is never emitted
/// while any of its artifacts is still pending upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabularRecord {
    /// Suite path joined into a single display string
    pub suite_path: String,
    pub spec_title: String,
    pub project_name: String,
    pub attempt_index: u32,
    pub status: TestStatus,
    pub duration_ms: u64,
    pub error_message: Option<String>,
    /// Resolved evidence links in capture order
    pub artifacts: Vec<ArtifactLink>,
}

/// A per-key upload failure surfaced to the caller
///
/// Upload failures never abort the run; they are collected and returned
/// alongside the best-effort records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadWarning {
    /// Key of the artifact that failed to stage
    pub key: ArtifactKey,
    /// Human-readable failure reason
    pub reason: String,
}

impl UploadWarning {
    pub fn new(key: ArtifactKey, reason: impl Into<String>) -> Self {
        Self {
            key,
            reason: reason.into(),
        }
    }
}
