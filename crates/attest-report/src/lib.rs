//! # attest-report
//!
//! Report-side half of the Attest pipeline: the serde schema for the raw
//! test-run document, the depth-first walker that flattens it into
//! [`attest_core::TestOutcome`] values, and the extractor that assigns each
//! attachment its deterministic [`attest_core::ArtifactKey`] and content type.
//!
//! Everything in this crate is pure and synchronous; no I/O happens here.

pub mod extract;
pub mod schema;
pub mod walker;

pub use extract::{ArtifactPlan, AttachmentExtractor};
pub use schema::TestRunReport;
pub use walker::{walk, walk_collect};
