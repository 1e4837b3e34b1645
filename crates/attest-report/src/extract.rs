//! Artifact key assignment and content-type inference
//!
//! For each attachment of an outcome the extractor computes a deterministic
//! [`ArtifactKey`] and resolves a content type. Both the upload phase and the
//! final join re-run this extraction, so the two sides agree on keys by
//! construction and never rely on positional correlation.

use std::collections::HashMap;
use std::path::Path;

use attest_core::{ArtifactKey, AttachmentSource, RawAttachment, TestOutcome};

/// One attachment ready for staging: a key, a resolved content type, and the
/// byte source to upload
#[derive(Debug, Clone)]
pub struct ArtifactPlan {
    pub key: ArtifactKey,
    pub name: String,
    pub content_type: String,
    pub source: AttachmentSource,
}

/// Assigns stable artifact keys and content types to an outcome's attachments
#[derive(Debug, Clone, Default)]
pub struct AttachmentExtractor {
    /// Optional run-scoping prefix prepended to every key
    key_prefix: Option<String>,
}

impl AttachmentExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            key_prefix: Some(prefix.into()),
        }
    }

    /// Plan every attachment of one outcome, in capture order.
    ///
    /// Pure function of its input; the same outcome always yields the same
    /// plans. Attachments sharing a name within the outcome get `#2`, `#3`, …
    /// suffixes in encounter order; the first occurrence keeps the bare name.
    pub fn extract(&self, outcome: &TestOutcome) -> Vec<ArtifactPlan> {
        let mut seen: HashMap<&str, u32> = HashMap::new();
        outcome
            .attachments
            .iter()
            .map(|attachment| {
                let occurrence = seen.entry(attachment.name.as_str()).or_insert(0);
                *occurrence += 1;
                ArtifactPlan {
                    key: self.derive_key(outcome, &attachment.name, *occurrence),
                    name: attachment.name.clone(),
                    content_type: resolve_content_type(attachment),
                    source: attachment.source.clone(),
                }
            })
            .collect()
    }

    /// Derive the storage key for the `occurrence`-th attachment (1-based)
    /// named `name` within `outcome`
    fn derive_key(&self, outcome: &TestOutcome, name: &str, occurrence: u32) -> ArtifactKey {
        let mut segments: Vec<String> = Vec::new();
        if let Some(prefix) = &self.key_prefix {
            segments.push(prefix.clone());
        }
        segments.extend(outcome.suite_path.iter().map(|s| sanitize_segment(s)));
        segments.push(sanitize_segment(&outcome.spec_title));
        segments.push(sanitize_segment(&outcome.project_name));
        segments.push(format!("attempt-{}", outcome.attempt_index));

        let mut leaf = sanitize_segment(name);
        if occurrence > 1 {
            leaf = format!("{}#{}", leaf, occurrence);
        }
        segments.push(leaf);

        ArtifactKey::new(segments.join("/"))
    }
}

/// Map path separators out of a single key segment so segment boundaries in
/// the assembled key stay meaningful
fn sanitize_segment(segment: &str) -> String {
    let cleaned: String = segment
        .chars()
        .map(|c| if c == '/' || c == '\\' { '-' } else { c })
        .collect();
    if cleaned.is_empty() {
        "_".to_string()
    } else {
        cleaned
    }
}

/// Resolve the content type for an attachment: the declared type wins,
/// otherwise it is inferred from the name's file extension
pub fn resolve_content_type(attachment: &RawAttachment) -> String {
    match &attachment.content_type {
        Some(declared) => declared.clone(),
        None => infer_content_type(&attachment.name).to_string(),
    }
}

/// Infer a MIME type from a file name; never fails, unknown extensions
/// degrade to `application/octet-stream`
pub fn infer_content_type(name: &str) -> &'static str {
    let extension = Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());

    match extension.as_deref() {
        Some("png") => "image/png",
        Some("webm") => "video/webm",
        Some("zip") => "application/zip",
        Some("json") => "application/json",
        _ => "application/octet-stream",
    }
}
