//! Pipeline definition and execution.
//!
//! This module provides:
//! - Declarative stage and pipeline definitions
//! - Prompt templates fed by earlier stage outputs
//! - The sequential runner and its report
//! - Built-in presets

mod definition;
pub mod presets;
mod prompt;
mod report;
mod result;
mod runner;
mod state;

pub use definition::{PipelineConfigFile, PipelineDefinition, StageConfig, StageDefinition};
pub use presets::Preset;
pub use prompt::{PromptBuilder, PromptContext, PromptFn, PromptTemplate};
pub use report::{PipelineFailure, PipelineReport};
pub use result::{StageOutput, StageResult};
pub use runner::PipelineRunner;
pub use state::RunState;
