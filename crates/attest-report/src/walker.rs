//! Depth-first report walker
//!
//! Flattens the nested report tree into one [`TestOutcome`] per leaf
//! (test case, attempt) pair. Traversal is lazy and depth-first with suite
//! children visited in declaration order, so the emitted sequence is
//! deterministic and matches the source document. Duplicate-name key
//! disambiguation downstream depends on that ordering.
//!
//! The walker performs no I/O. The only way it fails is a structurally
//! malformed document, which yields [`AttestError::MalformedReport`] and fuses
//! the iterator; nothing past the defect is emitted.

use std::collections::VecDeque;
use std::path::PathBuf;

use attest_core::{AttachmentSource, AttestError, RawAttachment, Result, TestOutcome, TestStatus};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use tracing::debug;

use crate::schema::{AttachmentNode, ResultNode, SpecNode, SuiteNode, TestRunReport};

/// Walk a parsed report lazily, yielding outcomes in document order
pub fn walk(report: &TestRunReport) -> Walk<'_> {
    Walk {
        stack: report
            .suites
            .iter()
            .rev()
            .map(|suite| (suite, Vec::new()))
            .collect(),
        pending: VecDeque::new(),
        fused: false,
    }
}

/// Eagerly collect the walk, failing fast on the first malformed node
///
/// The pipeline uses this before staging so that no upload is attempted for a
/// report that turns out to be structurally invalid further down the tree.
pub fn walk_collect(report: &TestRunReport) -> Result<Vec<TestOutcome>> {
    let outcomes: Vec<TestOutcome> = walk(report).collect::<Result<_>>()?;
    debug!("Walked report into {} test outcomes", outcomes.len());
    Ok(outcomes)
}

/// Lazy depth-first iterator over a report's leaf attempts
pub struct Walk<'a> {
    /// Suites still to visit, most recently discovered on top; each carries
    /// the suite-path of its parent
    stack: Vec<(&'a SuiteNode, Vec<String>)>,
    /// Outcomes flattened from the current suite, not yet yielded
    pending: VecDeque<Result<TestOutcome>>,
    /// Set after yielding an error; the iterator then stays exhausted
    fused: bool,
}

impl<'a> Iterator for Walk<'a> {
    type Item = Result<TestOutcome>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.fused {
                return None;
            }
            if let Some(item) = self.pending.pop_front() {
                if item.is_err() {
                    self.fused = true;
                }
                return Some(item);
            }
            let (suite, parent_path) = self.stack.pop()?;
            self.visit_suite(suite, parent_path);
        }
    }
}

impl<'a> Walk<'a> {
    /// Flatten one suite's specs into `pending` and queue its child suites.
    ///
    /// On a structural defect the error is queued after any outcomes that
    /// legitimately precede it and descent stops.
    fn visit_suite(&mut self, suite: &'a SuiteNode, parent_path: Vec<String>) {
        let Some(title) = suite.title.as_deref() else {
            self.pending.push_back(Err(AttestError::MalformedReport(format!(
                "suite node missing title under [{}]",
                parent_path.join(" > ")
            ))));
            return;
        };

        let mut path = parent_path;
        path.push(title.to_string());

        for spec in &suite.specs {
            match flatten_spec(spec, &path) {
                Ok(outcomes) => self.pending.extend(outcomes.into_iter().map(Ok)),
                Err(e) => {
                    self.pending.push_back(Err(e));
                    return;
                }
            }
        }

        // Reverse push keeps declaration order on a LIFO stack
        for child in suite.suites.iter().rev() {
            self.stack.push((child, path.clone()));
        }
    }
}

fn flatten_spec(spec: &SpecNode, suite_path: &[String]) -> Result<Vec<TestOutcome>> {
    let title = spec.title.as_deref().ok_or_else(|| {
        AttestError::MalformedReport(format!(
            "spec node missing title in suite \"{}\"",
            suite_path.join(" > ")
        ))
    })?;

    let mut outcomes = Vec::new();
    for test in &spec.tests {
        let project = test.project_name.as_deref().ok_or_else(|| {
            AttestError::MalformedReport(format!(
                "test entry missing project name in spec \"{}\"",
                title
            ))
        })?;
        for (attempt_index, result) in test.results.iter().enumerate() {
            outcomes.push(flatten_result(
                result,
                suite_path,
                title,
                project,
                attempt_index as u32,
            )?);
        }
    }
    Ok(outcomes)
}

fn flatten_result(
    result: &ResultNode,
    suite_path: &[String],
    spec_title: &str,
    project_name: &str,
    attempt_index: u32,
) -> Result<TestOutcome> {
    let status_raw = result.status.as_deref().ok_or_else(|| {
        AttestError::MalformedReport(format!("result missing status in spec \"{}\"", spec_title))
    })?;
    let status: TestStatus = status_raw.parse().map_err(|_| {
        AttestError::MalformedReport(format!(
            "unknown status \"{}\" in spec \"{}\"",
            status_raw, spec_title
        ))
    })?;

    let attachments = result
        .attachments
        .iter()
        .map(|node| convert_attachment(node, spec_title))
        .collect::<Result<Vec<_>>>()?;

    Ok(TestOutcome {
        suite_path: suite_path.to_vec(),
        spec_title: spec_title.to_string(),
        project_name: project_name.to_string(),
        attempt_index,
        status,
        // Runners emit -1 for attempts that never ran
        duration_ms: if result.duration > 0.0 {
            result.duration as u64
        } else {
            0
        },
        error_message: result.error.as_ref().and_then(|e| e.message.clone()),
        attachments,
    })
}

fn convert_attachment(node: &AttachmentNode, spec_title: &str) -> Result<RawAttachment> {
    let name = node.name.clone().ok_or_else(|| {
        AttestError::MalformedReport(format!(
            "attachment missing name in spec \"{}\"",
            spec_title
        ))
    })?;

    let source = match (&node.path, &node.body) {
        (Some(path), None) => AttachmentSource::File(PathBuf::from(path)),
        (None, Some(body)) => {
            let bytes = BASE64.decode(body.as_bytes()).map_err(|e| {
                AttestError::MalformedReport(format!(
                    "attachment \"{}\" has an undecodable inline body: {}",
                    name, e
                ))
            })?;
            AttachmentSource::Inline(bytes)
        }
        (Some(_), Some(_)) => {
            return Err(AttestError::MalformedReport(format!(
                "attachment \"{}\" carries both a path and an inline body",
                name
            )))
        }
        (None, None) => {
            return Err(AttestError::MalformedReport(format!(
                "attachment \"{}\" carries neither a path nor an inline body",
                name
            )))
        }
    };

    Ok(RawAttachment {
        name,
        content_type: node.content_type.clone(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn report(value: serde_json::Value) -> TestRunReport {
        serde_json::from_value(value).unwrap()
    }

    fn passed_result() -> serde_json::Value {
        json!({"status": "passed", "duration": 100})
    }

    #[test]
    fn test_walk_counts_leaf_attempts() {
        // 2 specs x 1 project, one of them retried once: 3 outcomes total
        let report = report(json!({
            "suites": [{
                "title": "Root",
                "specs": [
                    {"title": "a", "tests": [{"projectName": "chromium", "results": [passed_result()]}]},
                    {"title": "b", "tests": [{"projectName": "chromium", "results": [
                        {"status": "failed", "duration": 50, "error": {"message": "boom"}},
                        passed_result()
                    ]}]}
                ]
            }]
        }));

        let outcomes = walk_collect(&report).unwrap();
        assert_eq!(outcomes.len(), 3);
        assert_eq!(outcomes[1].attempt_index, 0);
        assert_eq!(outcomes[1].status, TestStatus::Failed);
        assert_eq!(outcomes[1].error_message.as_deref(), Some("boom"));
        assert_eq!(outcomes[2].attempt_index, 1);
        assert_eq!(outcomes[2].status, TestStatus::Passed);
    }

    #[test]
    fn test_walk_preserves_declaration_order() {
        // Specs of a suite come before its child suites; siblings keep order
        let report = report(json!({
            "suites": [
                {
                    "title": "A",
                    "specs": [{"title": "a1", "tests": [{"projectName": "p", "results": [passed_result()]}]}],
                    "suites": [
                        {"title": "A1", "specs": [{"title": "a1-1", "tests": [{"projectName": "p", "results": [passed_result()]}]}]},
                        {"title": "A2", "specs": [{"title": "a2-1", "tests": [{"projectName": "p", "results": [passed_result()]}]}]}
                    ]
                },
                {"title": "B", "specs": [{"title": "b1", "tests": [{"projectName": "p", "results": [passed_result()]}]}]}
            ]
        }));

        let titles: Vec<String> = walk(&report)
            .map(|o| o.unwrap().spec_title)
            .collect();
        assert_eq!(titles, vec!["a1", "a1-1", "a2-1", "b1"]);
    }

    #[test]
    fn test_suite_path_excludes_spec_title() {
        let report = report(json!({
            "suites": [{
                "title": "Login",
                "suites": [{
                    "title": "Patient Search",
                    "specs": [{"title": "finds patient", "tests": [{"projectName": "chromium", "results": [passed_result()]}]}]
                }]
            }]
        }));

        let outcomes = walk_collect(&report).unwrap();
        assert_eq!(outcomes[0].suite_path, vec!["Login", "Patient Search"]);
        assert_eq!(outcomes[0].spec_title, "finds patient");
    }

    #[test]
    fn test_suite_missing_title_is_malformed() {
        let report = report(json!({
            "suites": [{"specs": [{"title": "a", "tests": []}]}]
        }));

        let err = walk_collect(&report).unwrap_err();
        assert!(matches!(err, AttestError::MalformedReport(_)));
    }

    #[test]
    fn test_error_fuses_iterator_after_preceding_outcomes() {
        let report = report(json!({
            "suites": [{
                "title": "Root",
                "specs": [
                    {"title": "ok", "tests": [{"projectName": "p", "results": [passed_result()]}]},
                    {"tests": [{"projectName": "p", "results": [passed_result()]}]}
                ]
            }]
        }));

        let mut iter = walk(&report);
        assert!(iter.next().unwrap().is_ok());
        assert!(iter.next().unwrap().is_err());
        assert!(iter.next().is_none());
    }

    #[test]
    fn test_unknown_status_is_malformed() {
        let report = report(json!({
            "suites": [{"title": "S", "specs": [{"title": "a", "tests": [
                {"projectName": "p", "results": [{"status": "exploded"}]}
            ]}]}]
        }));

        let err = walk_collect(&report).unwrap_err();
        assert!(err.to_string().contains("exploded"));
    }

    #[test]
    fn test_missing_project_name_is_malformed() {
        let report = report(json!({
            "suites": [{"title": "S", "specs": [{"title": "a", "tests": [
                {"results": [passed_result()]}
            ]}]}]
        }));

        assert!(walk_collect(&report).is_err());
    }

    #[test]
    fn test_negative_duration_clamps_to_zero() {
        let report = report(json!({
            "suites": [{"title": "S", "specs": [{"title": "a", "tests": [
                {"projectName": "p", "results": [{"status": "skipped", "duration": -1}]}
            ]}]}]
        }));

        let outcomes = walk_collect(&report).unwrap();
        assert_eq!(outcomes[0].duration_ms, 0);
    }

    #[test]
    fn test_inline_body_is_decoded() {
        let report = report(json!({
            "suites": [{"title": "S", "specs": [{"title": "a", "tests": [
                {"projectName": "p", "results": [{
                    "status": "passed",
                    "attachments": [{"name": "log.txt", "body": "aGVsbG8="}]
                }]}
            ]}]}]
        }));

        let outcomes = walk_collect(&report).unwrap();
        assert_eq!(
            outcomes[0].attachments[0].source,
            AttachmentSource::Inline(b"hello".to_vec())
        );
    }

    #[test]
    fn test_bad_base64_body_is_malformed() {
        let report = report(json!({
            "suites": [{"title": "S", "specs": [{"title": "a", "tests": [
                {"projectName": "p", "results": [{
                    "status": "passed",
                    "attachments": [{"name": "log.txt", "body": "!!not-base64!!"}]
                }]}
            ]}]}]
        }));

        assert!(walk_collect(&report).is_err());
    }

    #[test]
    fn test_attachment_with_both_forms_is_malformed() {
        let report = report(json!({
            "suites": [{"title": "S", "specs": [{"title": "a", "tests": [
                {"projectName": "p", "results": [{
                    "status": "passed",
                    "attachments": [{"name": "x", "path": "x.bin", "body": "aGk="}]
                }]}
            ]}]}]
        }));

        let err = walk_collect(&report).unwrap_err();
        assert!(err.to_string().contains("both"));
    }

    #[test]
    fn test_attachment_with_neither_form_is_malformed() {
        let report = report(json!({
            "suites": [{"title": "S", "specs": [{"title": "a", "tests": [
                {"projectName": "p", "results": [{
                    "status": "passed",
                    "attachments": [{"name": "x"}]
                }]}
            ]}]}]
        }));

        assert!(walk_collect(&report).is_err());
    }
}
