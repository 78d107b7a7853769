//! # Modelchain
//!
//! Sequential multi-model pipelines over Amazon Bedrock.
//!
//! Modelchain runs an ordered list of stages. Each stage sends a prompt to
//! one foundation model, and later stages can quote what earlier ones
//! produced. It provides:
//!
//! - **Model adapter**: one request shape for Claude, Titan and Nova models
//! - **Declarative stages**: label, model, system prompt and prompt template
//! - **Fail-fast runner**: the first failing stage stops the run, with a
//!   timing report either way
//! - **Pluggable transport**: Bedrock in production, scripted replies in tests
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use modelchain::prelude::*;
//!
//! let pipeline = PipelineDefinition::new("review")
//!     .stage(StageDefinition::new("Draft", "anthropic.claude-3-haiku-20240307-v1:0")
//!         .with_template("{request}"))
//!     .stage(StageDefinition::new("Edit", "amazon.nova-lite-v1:0")
//!         .with_template("Tighten this text: {stage:Draft}"));
//!
//! let runner = PipelineRunner::new(BedrockTransport::connect("us-east-1")?);
//! let report = runner.run(&pipeline, "A haiku about ferries")?;
//! println!("{}", report.summary_table());
//! ```

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, missing_docs, rust_2018_idioms)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod adapter;
pub mod config;
pub mod errors;
pub mod events;
pub mod pipeline;
pub mod testing;
pub mod transport;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::adapter::{
        build_payload, classify, extract_text, invoke, ModelAdapter, ModelFamily, Request,
        WirePayload, WireResponse,
    };
    pub use crate::config::{apply_model_overrides, PipelineConfig};
    pub use crate::errors::{
        ConfigError, EmptyResponseError, ModelchainError, PipelineValidationError,
        TransportError, UnsupportedModelError,
    };
    pub use crate::events::{CollectingEventSink, EventSink, LoggingEventSink, NoOpEventSink};
    pub use crate::pipeline::{
        PipelineDefinition, PipelineFailure, PipelineReport, PipelineRunner, Preset,
        PromptBuilder, PromptContext, RunState, StageDefinition, StageOutput, StageResult,
    };
    #[cfg(feature = "bedrock")]
    pub use crate::transport::BedrockTransport;
    pub use crate::transport::Transport;
}
