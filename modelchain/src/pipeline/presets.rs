//! Built-in pipelines.

use super::{PipelineDefinition, StageDefinition};
use crate::errors::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Default model for the architecture stage.
pub const ARCHITECTURE_MODEL: &str = "anthropic.claude-3-sonnet-20240229-v1:0";
/// Default model for the development stage.
pub const DEVELOPMENT_MODEL: &str = "anthropic.claude-3-haiku-20240307-v1:0";
/// Default model for the testing stage.
pub const TESTING_MODEL: &str = "amazon.nova-lite-v1:0";
/// Default model for the documentation stage.
pub const DOCUMENTATION_MODEL: &str = "amazon.titan-text-express-v1";

/// A named built-in pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Preset {
    /// Architecture, development, testing, documentation.
    #[default]
    Game,
    /// Generate, then review.
    Content,
    /// Analyze, draft, edit.
    Analysis,
}

impl Preset {
    /// Builds the pipeline.
    #[must_use]
    pub fn definition(self) -> PipelineDefinition {
        match self {
            Self::Game => game_development(),
            Self::Content => content_review(),
            Self::Analysis => topic_analysis(),
        }
    }

    /// Request used when the caller gives none.
    #[must_use]
    pub const fn default_request(self) -> &'static str {
        match self {
            Self::Game => "Create a simple Tic-Tac-Toe (X&Os) game in Python",
            Self::Content => {
                "Write a short marketing message for a new AI-powered productivity app"
            }
            Self::Analysis => "Benefits of cloud computing for small businesses",
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Game => write!(f, "game"),
            Self::Content => write!(f, "content"),
            Self::Analysis => write!(f, "analysis"),
        }
    }
}

impl FromStr for Preset {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "game" => Ok(Self::Game),
            "content" => Ok(Self::Content),
            "analysis" => Ok(Self::Analysis),
            _ => Err(ConfigError::UnknownPreset(s.to_string())),
        }
    }
}

/// Four-stage software pipeline: architecture, code, tests, docs.
///
/// The documentation stage runs on Titan, which has no system prompt, so its
/// role is spelled out in the user text instead.
#[must_use]
pub fn game_development() -> PipelineDefinition {
    PipelineDefinition::new("game-development")
        .stage(
            StageDefinition::new("Architecture", ARCHITECTURE_MODEL)
                .with_system_prompt(
                    "You are a software architect. Create detailed technical specifications \
                     and architecture for software projects.",
                )
                .with_template("Create a detailed architecture and rulebook for: {request}"),
        )
        .stage(
            StageDefinition::new("Development", DEVELOPMENT_MODEL)
                .with_system_prompt(
                    "You are a Python developer. Write clean, functional code based on \
                     specifications.",
                )
                .with_template(
                    "Based on this architecture, write complete Python code:\n{stage:Architecture}",
                ),
        )
        .stage(
            StageDefinition::new("Testing", TESTING_MODEL)
                .with_system_prompt(
                    "You are a QA engineer. Create comprehensive tests for code to ensure it \
                     works correctly.",
                )
                .with_template(
                    "Create comprehensive unit tests for this code:\n{stage:Development}",
                ),
        )
        .stage(StageDefinition::new("Documentation", DOCUMENTATION_MODEL).with_template(
            "Act as a technical writer. Create comprehensive documentation for this project: \
             {request}. Include setup instructions, usage guide, architecture overview, testing \
             approach, and API reference.\n\n\
             Architecture:\n{stage:Architecture}\n\n\
             Code Implementation:\n{stage:Development}\n\n\
             Test Suite:\n{stage:Testing}\n\n\
             Create documentation that explains the architecture decisions, how to use the \
             application, and how it was tested.",
        ))
}

/// Two-stage generate-then-review chain.
#[must_use]
pub fn content_review() -> PipelineDefinition {
    PipelineDefinition::new("content-review")
        .stage(
            StageDefinition::new("Content", DEVELOPMENT_MODEL)
                .with_system_prompt(
                    "You are a content creator. Generate creative content based on user input.",
                )
                .with_template("{request}"),
        )
        .stage(StageDefinition::new("Review", DOCUMENTATION_MODEL).with_template(
            "Act as an editor. Review and improve this content to make it more concise and \
             professional: {stage:Content}",
        ))
}

/// Three-stage analyze, draft, edit chain.
#[must_use]
pub fn topic_analysis() -> PipelineDefinition {
    PipelineDefinition::new("topic-analysis")
        .stage(
            StageDefinition::new("Analysis", DEVELOPMENT_MODEL)
                .with_template("Analyze this topic and suggest key points: {request}"),
        )
        .stage(
            StageDefinition::new("Draft", TESTING_MODEL)
                .with_template("Write content about: {request}. Key points: {stage:Analysis}"),
        )
        .stage(
            StageDefinition::new("Edit", DEVELOPMENT_MODEL)
                .with_template("Edit and polish this content: {stage:Draft}"),
        )
}
