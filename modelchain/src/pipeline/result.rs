//! Per-stage records produced by a run.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Timing record for one stage. Created once, never modified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageResult {
    /// Stage label.
    pub name: String,
    /// Wall-clock time spent in the stage.
    pub duration: Duration,
    /// Whether the stage produced text.
    pub success: bool,
}

impl StageResult {
    /// Creates a successful stage result.
    #[must_use]
    pub fn succeeded(name: impl Into<String>, duration: Duration) -> Self {
        Self {
            name: name.into(),
            duration,
            success: true,
        }
    }

    /// Creates a failed stage result.
    #[must_use]
    pub fn failed(name: impl Into<String>, duration: Duration) -> Self {
        Self {
            name: name.into(),
            duration,
            success: false,
        }
    }

    /// Returns the duration in seconds.
    #[must_use]
    pub fn seconds(&self) -> f64 {
        self.duration.as_secs_f64()
    }

    /// Status word used in the summary table.
    #[must_use]
    pub const fn status_label(&self) -> &'static str {
        if self.success {
            "SUCCESS"
        } else {
            "FAILED"
        }
    }
}

impl fmt::Display for StageResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:<35}: {:>8.2} sec [{}]",
            self.name,
            self.seconds(),
            self.status_label()
        )
    }
}

/// Text produced by a successful stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageOutput {
    /// Stage label.
    pub label: String,
    /// The model's reply.
    pub text: String,
}

impl StageOutput {
    /// Creates a stage output.
    #[must_use]
    pub fn new(label: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            text: text.into(),
        }
    }
}
