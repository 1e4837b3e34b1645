//! Serde schema for the raw test-run report document
//!
//! The document is a tree: suites nest suites and contain specs, specs contain
//! one test entry per project, and each test carries one result per attempt.
//! Required fields are modeled as `Option` here and validated by the walker so
//! a structural defect surfaces as [`attest_core::AttestError::MalformedReport`]
//! with context, not as a bare deserialization failure.

use attest_core::{AttestError, Result};
use serde::Deserialize;

/// Root of a parsed test-run report
#[derive(Debug, Clone, Deserialize)]
pub struct TestRunReport {
    /// Top-level suites in declaration order
    #[serde(default)]
    pub suites: Vec<SuiteNode>,
}

impl TestRunReport {
    /// Parse a report from its serialized JSON form
    pub fn from_json(raw: &str) -> Result<Self> {
        serde_json::from_str(raw)
            .map_err(|e| AttestError::MalformedReport(format!("invalid report document: {}", e)))
    }
}

/// A suite node; may nest further suites to arbitrary depth
#[derive(Debug, Clone, Deserialize)]
pub struct SuiteNode {
    pub title: Option<String>,
    #[serde(default)]
    pub suites: Vec<SuiteNode>,
    #[serde(default)]
    pub specs: Vec<SpecNode>,
}

/// A spec: one named test scenario
#[derive(Debug, Clone, Deserialize)]
pub struct SpecNode {
    pub title: Option<String>,
    /// One entry per project (browser/device profile) the spec ran under
    #[serde(default)]
    pub tests: Vec<TestNode>,
}

/// A test case: a spec bound to one project
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestNode {
    pub project_name: Option<String>,
    /// One result per attempt, first attempt first
    #[serde(default)]
    pub results: Vec<ResultNode>,
}

/// One attempt result
#[derive(Debug, Clone, Deserialize)]
pub struct ResultNode {
    pub status: Option<String>,
    /// Duration in milliseconds; runners emit -1 for attempts that never ran
    #[serde(default)]
    pub duration: f64,
    pub error: Option<ErrorNode>,
    #[serde(default)]
    pub attachments: Vec<AttachmentNode>,
}

/// Error detail attached to a failed attempt
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorNode {
    pub message: Option<String>,
}

/// Raw attachment descriptor: a name plus either an on-disk path or an inline
/// base64 body, never both
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentNode {
    pub name: Option<String>,
    pub content_type: Option<String>,
    pub path: Option<String>,
    pub body: Option<String>,
}
