//! # attest-core
//!
//! Core types for Attest, the test-evidence correlation pipeline of a
//! browser-automation test runner.
//!
//! A test run produces a nested report (suites → specs → test cases → attempt
//! results → attachments). Attest flattens that tree into tabular per-attempt
//! records and uploads every captured artifact under a stable, deterministic
//! key so the resolved URLs can be joined back into the records.
//!
//! ## Core Paradigm
//!
//! - Every leaf test attempt becomes exactly one [`TestOutcome`]
//! - Every attachment gets a deterministic [`ArtifactKey`] before upload
//! - Records and uploads are correlated by key equality, never by position
//! - The whole graph lives and dies within a single pipeline run

#![allow(dead_code)]

mod config;
mod error;
mod types;

pub use config::PipelineConfig;
pub use error::{AttestError, Result};
pub use types::*;
