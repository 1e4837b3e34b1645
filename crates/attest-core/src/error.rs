//! Unified error types for Attest

use thiserror::Error;

/// Unified error type for all Attest operations
#[derive(Error, Debug)]
pub enum AttestError {
    // Report errors
    #[error("malformed report: {0}")]
    MalformedReport(String),

    // Per-artifact errors
    #[error("upload failed for artifact {key}: {reason}")]
    ArtifactUpload { key: String, reason: String },

    #[error("byte source unreadable for artifact {key}: {reason}")]
    ByteSourceRead { key: String, reason: String },

    // Collaborator errors
    #[error("blob store error: {0}")]
    BlobStore(String),

    #[error("record sink error: {0}")]
    RecordSink(String),

    // Configuration errors
    #[error("config error: {0}")]
    Config(String),

    // I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // Generic
    #[error("{0}")]
    Other(String),
}

impl AttestError {
    /// Whether this error aborts the whole pipeline.
    ///
    /// Only structural report defects are fatal; per-artifact failures are
    /// collected and surfaced as warnings after the run completes.
    pub fn is_fatal(&self) -> bool {
        matches!(self, AttestError::MalformedReport(_))
    }
}

/// Result type alias using AttestError
pub type Result<T> = std::result::Result<T, AttestError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_classification() {
        assert!(AttestError::MalformedReport("suite without title".into()).is_fatal());
        assert!(!AttestError::ArtifactUpload {
            key: "k".into(),
            reason: "store down".into()
        }
        .is_fatal());
        assert!(!AttestError::ByteSourceRead {
            key: "k".into(),
            reason: "missing file".into()
        }
        .is_fatal());
    }

    #[test]
    fn test_error_display_includes_key() {
        let err = AttestError::ArtifactUpload {
            key: "Login/spec/chromium/attempt-0/shot.png".into(),
            reason: "503".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("Login/spec/chromium/attempt-0/shot.png"));
        assert!(msg.contains("503"));
    }
}
