//! Evidence pipeline driver
//!
//! Runs the fixed phase order: walk (fail-fast) → extract → stage (the only
//! concurrent phase) → project. A structurally malformed report aborts before
//! any upload is attempted; per-artifact failures never abort and are
//! returned to the caller as warnings alongside the best-effort records.

use std::sync::Arc;

use attest_core::{
    PipelineConfig, Result, TabularRecord, TestStatus, UploadWarning,
};
use attest_report::{walker, ArtifactPlan, AttachmentExtractor, TestRunReport};
use attest_store::BlobStore;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;

use crate::project::TabularProjector;
use crate::stager::ArtifactStager;

/// Aggregate numbers for one pipeline run
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Leaf (test, attempt) pairs walked out of the report
    pub total_attempts: usize,
    pub passed: usize,
    pub failed: usize,
    pub timed_out: usize,
    pub skipped: usize,
    pub interrupted: usize,
    /// Attachment descriptors found across all attempts
    pub attachments_seen: usize,
    pub artifacts_uploaded: usize,
    pub uploads_failed: usize,
}

/// Everything a pipeline run hands back to the orchestrator
#[derive(Debug)]
pub struct PipelineOutput {
    /// Sink-ready rows in the walker's deterministic order
    pub records: Vec<TabularRecord>,
    /// One entry per artifact that failed to stage
    pub warnings: Vec<UploadWarning>,
    pub summary: RunSummary,
}

/// Drives one report through walk → extract → stage → project
pub struct EvidencePipeline {
    store: Arc<dyn BlobStore>,
    config: PipelineConfig,
}

impl EvidencePipeline {
    pub fn new(store: Arc<dyn BlobStore>, config: PipelineConfig) -> Self {
        Self { store, config }
    }

    /// Convenience entry point for a still-serialized report document
    pub async fn run_json(&self, raw: &str) -> Result<PipelineOutput> {
        let report = TestRunReport::from_json(raw)?;
        self.run(&report).await
    }

    /// Run the full pipeline over a parsed report.
    ///
    /// Fails only on a malformed report; upload failures surface in
    /// `PipelineOutput::warnings` instead.
    pub async fn run(&self, report: &TestRunReport) -> Result<PipelineOutput> {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        info!("Evidence pipeline run {} starting", run_id);

        // Walk everything up front so a defect deep in the tree aborts
        // before the first upload
        let outcomes = walker::walk_collect(report)?;

        let extractor = match &self.config.key_prefix {
            Some(prefix) => AttachmentExtractor::with_prefix(prefix.clone()),
            None => AttachmentExtractor::new(),
        };
        let plans: Vec<ArtifactPlan> = outcomes
            .iter()
            .flat_map(|outcome| extractor.extract(outcome))
            .collect();
        let attachments_seen = plans.len();
        debug!(
            "Extracted {} artifact plans from {} outcomes",
            attachments_seen,
            outcomes.len()
        );

        let stager = ArtifactStager::new(
            Arc::clone(&self.store),
            self.config.working_dir.clone(),
            self.config.upload_timeout(),
        );
        let staged = stager.stage(plans).await;

        let projector =
            TabularProjector::new(extractor, self.config.suite_separator.clone());
        let projected = projector.project(&outcomes, &staged.uploaded);

        // Every key the projector omitted corresponds to a stage failure;
        // the stager's warnings carry the reasons
        let warnings = staged.failures;

        let summary = RunSummary {
            run_id,
            started_at,
            finished_at: Utc::now(),
            total_attempts: outcomes.len(),
            passed: count_status(&outcomes, TestStatus::Passed),
            failed: count_status(&outcomes, TestStatus::Failed),
            timed_out: count_status(&outcomes, TestStatus::TimedOut),
            skipped: count_status(&outcomes, TestStatus::Skipped),
            interrupted: count_status(&outcomes, TestStatus::Interrupted),
            attachments_seen,
            artifacts_uploaded: staged.uploaded.len(),
            uploads_failed: warnings.len(),
        };

        info!(
            "Evidence pipeline run {} finished: {} records, {} uploads, {} warnings",
            run_id,
            projected.records.len(),
            summary.artifacts_uploaded,
            warnings.len()
        );

        Ok(PipelineOutput {
            records: projected.records,
            warnings,
            summary,
        })
    }
}

fn count_status(outcomes: &[attest_core::TestOutcome], status: TestStatus) -> usize {
    outcomes.iter().filter(|o| o.status == status).count()
}
