//! # attest-pipeline
//!
//! The driving half of Attest: stages every planned artifact into the blob
//! store concurrently, then joins the resulting URLs back into flat tabular
//! records.
//!
//! Phases run in a fixed order (walk, extract, stage, project) and only the
//! stage phase performs I/O or concurrency. The projector never runs until
//! every upload task has settled, so the join always sees a complete (or
//! completely-known-incomplete) key map.

pub mod pipeline;
pub mod project;
pub mod sink;
pub mod stager;

pub use pipeline::{EvidencePipeline, PipelineOutput, RunSummary};
pub use project::{ProjectOutput, TabularProjector};
pub use sink::{JsonlSink, MemorySink, RecordSink};
pub use stager::{ArtifactStager, StageOutcome};
