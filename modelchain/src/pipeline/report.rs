//! Run reports and their text rendering.

use super::{RunState, StageOutput, StageResult};
use crate::errors::ModelchainError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

const RULE_WIDTH: usize = 50;

/// What a finished run leaves behind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineReport {
    /// Unique id for this run.
    pub run_id: Uuid,
    /// Pipeline name.
    pub pipeline: String,
    /// When the run started.
    pub started_at: DateTime<Utc>,
    /// One record per stage that ran, in order.
    pub results: Vec<StageResult>,
    /// Text of every successful stage, in order.
    pub outputs: Vec<StageOutput>,
    /// Wall-clock time of the whole run.
    pub total_duration: Duration,
    /// Final state.
    pub state: RunState,
}

impl PipelineReport {
    /// Returns true if every stage succeeded.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.state == RunState::Completed
    }

    /// Text of the last stage, if the run completed.
    #[must_use]
    pub fn final_output(&self) -> Option<&str> {
        if self.is_success() {
            self.outputs.last().map(|o| o.text.as_str())
        } else {
            None
        }
    }

    /// Output of the stage labelled `label`.
    #[must_use]
    pub fn output(&self, label: &str) -> Option<&str> {
        self.outputs
            .iter()
            .find(|o| o.label == label)
            .map(|o| o.text.as_str())
    }

    /// Sum of the durations of the successful stages.
    #[must_use]
    pub fn successful_duration(&self) -> Duration {
        self.results
            .iter()
            .filter(|r| r.success)
            .map(|r| r.duration)
            .sum()
    }

    /// The failed stage, if any.
    #[must_use]
    pub fn failed_stage(&self) -> Option<&StageResult> {
        self.results.iter().find(|r| !r.success)
    }

    /// Renders the timing table.
    #[must_use]
    pub fn summary_table(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "TIMING SUMMARY");
        let _ = writeln!(out, "{}", "-".repeat(RULE_WIDTH));
        for result in &self.results {
            let _ = writeln!(out, "{result}");
        }
        let _ = writeln!(out, "{}", "-".repeat(RULE_WIDTH));
        let _ = writeln!(
            out,
            "Total Pipeline Time: {:.2} seconds",
            self.total_duration.as_secs_f64()
        );
        let _ = write!(out, "{}", "=".repeat(RULE_WIDTH));
        out
    }
}

/// A run that stopped on its first error.
///
/// Carries the partial report alongside the original error.
#[derive(Debug, Error)]
#[error("{}", describe_failure(.stage.as_deref(), .source))]
pub struct PipelineFailure {
    /// Report up to and including the failed stage.
    pub report: PipelineReport,
    /// Label of the failed stage; `None` if the pipeline never started.
    pub stage: Option<String>,
    /// The error that stopped the run.
    #[source]
    pub source: ModelchainError,
}

fn describe_failure(stage: Option<&str>, source: &ModelchainError) -> String {
    match stage {
        Some(stage) => format!("Stage '{stage}' failed: {source}"),
        None => format!("Pipeline did not start: {source}"),
    }
}

impl PipelineFailure {
    /// Renders the failure block shown to the user, ending with the usual
    /// suspects for Bedrock failures.
    #[must_use]
    pub fn diagnostics(&self, region: &str) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "PIPELINE FAILED: {self}");
        if let Some(failed) = self.report.failed_stage() {
            let _ = writeln!(
                out,
                "Failed stage: {} after {:.2} seconds",
                failed.name,
                failed.seconds()
            );
        }
        let _ = writeln!(
            out,
            "Time spent before failure: {:.2} seconds",
            self.report.total_duration.as_secs_f64()
        );
        let _ = writeln!(out, "Error: {}", self.source);

        let _ = writeln!(out);
        let _ = writeln!(out, "Possible causes:");
        let _ = writeln!(out, "1. Network connectivity issue");
        let _ = writeln!(out, "2. Invalid AWS credentials");
        let _ = writeln!(out, "3. Model not available in region {region}");
        let _ = write!(out, "4. Insufficient permissions for the model");
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{EmptyResponseError, TransportError};

    fn report(results: Vec<StageResult>, state: RunState) -> PipelineReport {
        PipelineReport {
            run_id: Uuid::new_v4(),
            pipeline: "test".to_string(),
            started_at: Utc::now(),
            outputs: results
                .iter()
                .filter(|r| r.success)
                .map(|r| StageOutput::new(&r.name, format!("{} text", r.name)))
                .collect(),
            total_duration: results.iter().map(|r| r.duration).sum(),
            results,
            state,
        }
    }

    #[test]
    fn test_summary_table_layout() {
        let report = report(
            vec![
                StageResult::succeeded("Architecture", Duration::from_millis(2500)),
                StageResult::failed("Development", Duration::from_millis(500)),
            ],
            RunState::Failed(1),
        );

        let table = report.summary_table();
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(lines[0], "TIMING SUMMARY");
        assert_eq!(lines[1], "-".repeat(50));
        assert!(lines[2].starts_with("Architecture"));
        assert!(lines[2].contains("2.50 sec [SUCCESS]"));
        assert!(lines[3].contains("0.50 sec [FAILED]"));
        assert_eq!(lines[5], "Total Pipeline Time: 3.00 seconds");
        assert_eq!(lines[6], "=".repeat(50));
    }

    #[test]
    fn test_final_output_only_when_complete() {
        let done = report(
            vec![
                StageResult::succeeded("a", Duration::from_millis(1)),
                StageResult::succeeded("b", Duration::from_millis(1)),
            ],
            RunState::Completed,
        );
        assert_eq!(done.final_output(), Some("b text"));
        assert_eq!(done.output("a"), Some("a text"));

        let failed = report(
            vec![StageResult::failed("a", Duration::from_millis(1))],
            RunState::Failed(0),
        );
        assert_eq!(failed.final_output(), None);
        assert_eq!(failed.failed_stage().map(|r| r.name.as_str()), Some("a"));
    }

    #[test]
    fn test_failure_message_names_stage() {
        let failure = PipelineFailure {
            report: report(vec![], RunState::Failed(0)),
            stage: Some("Development".to_string()),
            source: TransportError::new("connection refused").into(),
        };
        assert_eq!(
            failure.to_string(),
            "Stage 'Development' failed: connection refused"
        );
    }

    #[test]
    fn test_transport_diagnostics_list_causes() {
        let failure = PipelineFailure {
            report: report(
                vec![StageResult::failed("Architecture", Duration::from_secs(1))],
                RunState::Failed(0),
            ),
            stage: Some("Architecture".to_string()),
            source: TransportError::new("AccessDeniedException").into(),
        };

        let text = failure.diagnostics("eu-west-1");
        assert!(text.contains("Failed stage: Architecture after 1.00 seconds"));
        assert!(text.contains("Error: AccessDeniedException"));
        assert!(text.contains("Model not available in region eu-west-1"));
    }

    #[test]
    fn test_every_failure_lists_causes() {
        let failure = PipelineFailure {
            report: report(vec![], RunState::Failed(0)),
            stage: Some("Testing".to_string()),
            source: EmptyResponseError::new("amazon.nova-lite-v1:0", "missing").into(),
        };
        let text = failure.diagnostics("us-east-1");
        assert!(text.contains("Error: No content in response from amazon.nova-lite-v1:0"));
        assert!(text.contains("Possible causes:"));
        assert!(text.ends_with("4. Insufficient permissions for the model"));
    }
}
