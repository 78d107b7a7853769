//! Run state machine.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a pipeline run is.
///
/// `NotStarted -> Running(0) -> Running(1) -> ... -> Completed`, or
/// `Running(i) -> Failed(i)` on the first error. Both end states are final.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "state", content = "stage")]
pub enum RunState {
    /// No stage has started.
    NotStarted,
    /// The stage at this index is executing.
    Running(usize),
    /// Every stage succeeded.
    Completed,
    /// The stage at this index failed; later stages never ran.
    Failed(usize),
}

impl Default for RunState {
    fn default() -> Self {
        Self::NotStarted
    }
}

impl RunState {
    /// Moves to the next stage. Terminal states stay put.
    #[must_use]
    pub const fn advance(self) -> Self {
        match self {
            Self::NotStarted => Self::Running(0),
            Self::Running(i) => Self::Running(i + 1),
            other => other,
        }
    }

    /// Marks the current stage as failed. Only valid while running.
    #[must_use]
    pub const fn fail(self) -> Self {
        match self {
            Self::Running(i) => Self::Failed(i),
            other => other,
        }
    }

    /// Marks the run as finished. Only valid while running.
    #[must_use]
    pub const fn complete(self) -> Self {
        match self {
            Self::Running(_) => Self::Completed,
            other => other,
        }
    }

    /// Returns true for `Completed` and `Failed`.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed(_))
    }

    /// Index of the running or failed stage.
    #[must_use]
    pub const fn stage_index(self) -> Option<usize> {
        match self {
            Self::Running(i) | Self::Failed(i) => Some(i),
            Self::NotStarted | Self::Completed => None,
        }
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotStarted => write!(f, "not_started"),
            Self::Running(i) => write!(f, "running({i})"),
            Self::Completed => write!(f, "completed"),
            Self::Failed(i) => write!(f, "failed({i})"),
        }
    }
}
