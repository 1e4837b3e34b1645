//! Example of running the evidence pipeline against a report file.
//!
//! This example demonstrates how to:
//! 1. Load pipeline configuration
//! 2. Wire a filesystem blob store
//! 3. Run a report through the pipeline
//! 4. Append the projected records to a JSONL sink
//!
//! Run with:
//! ```bash
//! cargo run --package attest-pipeline --example pipeline_demo -- report.json
//! ```

use std::sync::Arc;

use anyhow::Result;
use attest_core::PipelineConfig;
use attest_pipeline::{EvidencePipeline, JsonlSink, RecordSink};
use attest_store::FsBlobStore;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing for logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let report_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "report.json".to_string());

    info!("Reading report from {}", report_path);
    let raw = std::fs::read_to_string(&report_path)?;

    let config = PipelineConfig::load_or_default(std::path::Path::new("."))?;
    let store = Arc::new(FsBlobStore::new("attest-artifacts"));
    let pipeline = EvidencePipeline::new(store, config);

    let output = pipeline.run_json(&raw).await?;

    for warning in &output.warnings {
        warn!("Missing evidence for {}: {}", warning.key, warning.reason);
    }

    let sink = JsonlSink::new("attest-records.jsonl");
    sink.append_records(&output.records).await?;

    let summary = &output.summary;
    info!(
        "Run {}: {} attempts ({} passed, {} failed, {} timed out, {} skipped, {} interrupted)",
        summary.run_id,
        summary.total_attempts,
        summary.passed,
        summary.failed,
        summary.timed_out,
        summary.skipped,
        summary.interrupted
    );
    info!(
        "Uploaded {}/{} artifacts, {} records appended",
        summary.artifacts_uploaded,
        summary.attachments_seen,
        output.records.len()
    );

    Ok(())
}
