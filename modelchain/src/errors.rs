//! Error types for modelchain.
//!
//! Every failure a stage can hit maps onto one variant of [`ModelchainError`].
//! None of them are retried: the first error aborts the pipeline run.

use std::error::Error as StdError;
use thiserror::Error;

/// The main error type for modelchain operations.
#[derive(Debug, Error)]
pub enum ModelchainError {
    /// The model identifier does not belong to a known family.
    #[error("{0}")]
    UnsupportedModel(#[from] UnsupportedModelError),

    /// The transport failed (network, auth, service).
    #[error("{0}")]
    Transport(#[from] TransportError),

    /// The model replied without usable text.
    #[error("{0}")]
    EmptyResponse(#[from] EmptyResponseError),

    /// The pipeline definition is invalid.
    #[error("{0}")]
    Validation(#[from] PipelineValidationError),

    /// Configuration could not be loaded.
    #[error("{0}")]
    Config(#[from] ConfigError),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl ModelchainError {
    /// Returns a short, stable name for the error kind.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::UnsupportedModel(_) => "unsupported_model",
            Self::Transport(_) => "transport",
            Self::EmptyResponse(_) => "empty_response",
            Self::Validation(_) => "validation",
            Self::Config(_) => "config",
            Self::Serialization(_) => "serialization",
        }
    }
}

impl From<serde_json::Error> for ModelchainError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Raised when no model family matches a model identifier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unsupported model: {model_id}")]
pub struct UnsupportedModelError {
    /// The identifier that failed to classify.
    pub model_id: String,
}

impl UnsupportedModelError {
    /// Creates a new unsupported model error.
    #[must_use]
    pub fn new(model_id: impl Into<String>) -> Self {
        Self {
            model_id: model_id.into(),
        }
    }
}

/// Raised by a [`Transport`](crate::transport::Transport) when the call itself fails.
///
/// The message is passed through as-is so the user sees what the service said.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct TransportError {
    /// Human readable failure description.
    pub message: String,
    /// Underlying error, when one exists.
    #[source]
    pub source: Option<Box<dyn StdError + Send + Sync>>,
}

impl TransportError {
    /// Creates a transport error from a message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Attaches the underlying error.
    #[must_use]
    pub fn with_source(mut self, source: impl StdError + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }
}

/// Raised when a reply has no text at the family's expected location.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("No content in response from {model_id}: {reason}")]
pub struct EmptyResponseError {
    /// The model that produced the reply.
    pub model_id: String,
    /// What was missing or malformed.
    pub reason: String,
}

impl EmptyResponseError {
    /// Creates a new empty response error.
    #[must_use]
    pub fn new(model_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            model_id: model_id.into(),
            reason: reason.into(),
        }
    }
}

/// Error raised when pipeline validation fails.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct PipelineValidationError {
    /// The error message.
    pub message: String,
    /// The stages involved in the error.
    pub stages: Vec<String>,
}

impl PipelineValidationError {
    /// Creates a new pipeline validation error.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            stages: Vec::new(),
        }
    }

    /// Sets the stages involved.
    #[must_use]
    pub fn with_stages(mut self, stages: Vec<String>) -> Self {
        self.stages = stages;
        self
    }
}

/// Errors related to loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A pipeline file could not be read.
    #[error("Failed to read {path}: {source}")]
    Read {
        /// The file path.
        path: String,
        /// The IO failure.
        #[source]
        source: std::io::Error,
    },

    /// A pipeline file is not valid JSON for a pipeline definition.
    #[error("Invalid pipeline file {path}: {message}")]
    Parse {
        /// The file path.
        path: String,
        /// Parser message.
        message: String,
    },

    /// The named preset does not exist.
    #[error("Unknown preset '{0}' (expected one of: game, content, analysis)")]
    UnknownPreset(String),
}
