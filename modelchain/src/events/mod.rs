//! Pipeline lifecycle events.
//!
//! The runner reports progress through an [`EventSink`] instead of printing.
//! Event types emitted by a run, in order:
//!
//! - `pipeline.started`
//! - `stage.started`, then `stage.completed` or `stage.failed`, per stage
//! - `pipeline.completed` or `pipeline.failed`
//! - `pipeline.summary`, always last

mod sink;

pub use sink::{CollectingEventSink, EventSink, LoggingEventSink, NoOpEventSink};

/// Event type constants.
pub mod types {
    /// A run began.
    pub const PIPELINE_STARTED: &str = "pipeline.started";
    /// Every stage succeeded.
    pub const PIPELINE_COMPLETED: &str = "pipeline.completed";
    /// A stage failed and the run stopped.
    pub const PIPELINE_FAILED: &str = "pipeline.failed";
    /// Timing table, emitted on both outcomes.
    pub const PIPELINE_SUMMARY: &str = "pipeline.summary";
    /// A stage is about to call its model.
    pub const STAGE_STARTED: &str = "stage.started";
    /// A stage produced text.
    pub const STAGE_COMPLETED: &str = "stage.completed";
    /// A stage failed.
    pub const STAGE_FAILED: &str = "stage.failed";
}
