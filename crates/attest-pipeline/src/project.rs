//! Tabular projection
//!
//! Joins walked outcomes with the frozen key→artifact map from the stage
//! phase. Keys are re-derived through the same extractor the stager used, so
//! the join is defined purely by key equality, never by position. An
//! attachment whose upload failed is omitted from its record's artifact list
//! and reported, never dropped without trace.

use std::collections::HashMap;

use attest_core::{ArtifactKey, ArtifactLink, TabularRecord, TestOutcome, UploadedArtifact};
use attest_report::AttachmentExtractor;
use tracing::warn;

/// Projected records plus the keys whose artifacts were not available
#[derive(Debug, Clone)]
pub struct ProjectOutput {
    /// One record per outcome, in the walker's order
    pub records: Vec<TabularRecord>,
    /// Keys omitted because no uploaded artifact existed for them
    pub missing: Vec<ArtifactKey>,
}

/// Projects outcomes into sink-ready rows
#[derive(Debug, Clone)]
pub struct TabularProjector {
    extractor: AttachmentExtractor,
    suite_separator: String,
}

impl TabularProjector {
    pub fn new(extractor: AttachmentExtractor, suite_separator: impl Into<String>) -> Self {
        Self {
            extractor,
            suite_separator: suite_separator.into(),
        }
    }

    /// Join outcomes against the uploaded map.
    ///
    /// Pure: projecting the same inputs twice yields identical output. The
    /// record order matches `outcomes`, which is the walker's deterministic
    /// order.
    pub fn project(
        &self,
        outcomes: &[TestOutcome],
        uploaded: &HashMap<ArtifactKey, UploadedArtifact>,
    ) -> ProjectOutput {
        let mut records = Vec::with_capacity(outcomes.len());
        let mut missing = Vec::new();

        for outcome in outcomes {
            let mut artifacts = Vec::new();
            for plan in self.extractor.extract(outcome) {
                match uploaded.get(&plan.key) {
                    Some(artifact) => artifacts.push(ArtifactLink {
                        name: plan.name,
                        url: artifact.url.clone(),
                        content_type: artifact.content_type.clone(),
                    }),
                    None => {
                        warn!("Omitting artifact {} from record: not uploaded", plan.key);
                        missing.push(plan.key);
                    }
                }
            }

            records.push(TabularRecord {
                suite_path: outcome.suite_path.join(&self.suite_separator),
                spec_title: outcome.spec_title.clone(),
                project_name: outcome.project_name.clone(),
                attempt_index: outcome.attempt_index,
                status: outcome.status,
                duration_ms: outcome.duration_ms,
                error_message: outcome.error_message.clone(),
                artifacts,
            });
        }

        ProjectOutput { records, missing }
    }
}
