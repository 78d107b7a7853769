//! Declarative stage and pipeline definitions.

use super::prompt::PromptBuilder;
use crate::errors::{ConfigError, PipelineValidationError};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// One stage: which model to call, with what system prompt, and how to build
/// its user text.
#[derive(Debug, Clone)]
pub struct StageDefinition {
    /// Display label, unique within a pipeline.
    pub label: String,
    /// Bedrock model id.
    pub model_id: String,
    /// System prompt; empty means none.
    pub system_prompt: String,
    /// User text builder.
    pub prompt: PromptBuilder,
}

impl StageDefinition {
    /// Creates a stage that forwards the previous output (or the request) as-is.
    #[must_use]
    pub fn new(label: impl Into<String>, model_id: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            model_id: model_id.into(),
            system_prompt: String::new(),
            prompt: PromptBuilder::template("{previous}"),
        }
    }

    /// Sets the system prompt.
    #[must_use]
    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = system_prompt.into();
        self
    }

    /// Sets a template prompt.
    #[must_use]
    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.prompt = PromptBuilder::template(template);
        self
    }

    /// Sets the prompt builder.
    #[must_use]
    pub fn with_prompt(mut self, prompt: PromptBuilder) -> Self {
        self.prompt = prompt;
        self
    }
}

/// Serializable form of a stage, as found in pipeline files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageConfig {
    /// Display label.
    pub label: String,
    /// Bedrock model id.
    pub model_id: String,
    /// System prompt.
    #[serde(default)]
    pub system_prompt: String,
    /// Prompt template.
    #[serde(default = "default_prompt")]
    pub prompt: String,
}

fn default_prompt() -> String {
    "{previous}".to_string()
}

impl From<StageConfig> for StageDefinition {
    fn from(config: StageConfig) -> Self {
        Self::new(config.label, config.model_id)
            .with_system_prompt(config.system_prompt)
            .with_template(config.prompt)
    }
}

/// Serializable form of a whole pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfigFile {
    /// Pipeline name.
    pub name: String,
    /// Stages in execution order.
    pub stages: Vec<StageConfig>,
}

/// An ordered list of stages.
#[derive(Debug, Clone)]
pub struct PipelineDefinition {
    name: String,
    stages: Vec<StageDefinition>,
}

impl PipelineDefinition {
    /// Creates an empty pipeline.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            stages: Vec::new(),
        }
    }

    /// Appends a stage.
    #[must_use]
    pub fn stage(mut self, stage: StageDefinition) -> Self {
        self.stages.push(stage);
        self
    }

    /// Returns the pipeline name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the stages in order.
    #[must_use]
    pub fn stages(&self) -> &[StageDefinition] {
        &self.stages
    }

    /// Returns the number of stages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Returns true if there are no stages.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Replaces the model of the stage labelled `label`. Returns false if absent.
    pub fn set_model(&mut self, label: &str, model_id: impl Into<String>) -> bool {
        match self.stages.iter_mut().find(|s| s.label == label) {
            Some(stage) => {
                stage.model_id = model_id.into();
                true
            }
            None => false,
        }
    }

    /// Checks the pipeline is runnable.
    ///
    /// Model ids are not classified here; an unsupported id fails its own
    /// stage when the run reaches it.
    ///
    /// # Errors
    ///
    /// Returns an error for an empty pipeline, blank or duplicate labels, and
    /// templates that reference a stage which does not run earlier.
    pub fn validate(&self) -> Result<(), PipelineValidationError> {
        if self.name.trim().is_empty() {
            return Err(PipelineValidationError::new(
                "Pipeline name cannot be empty or whitespace-only",
            ));
        }
        if self.stages.is_empty() {
            return Err(PipelineValidationError::new(format!(
                "Pipeline '{}' has no stages",
                self.name
            )));
        }

        let mut seen: HashSet<&str> = HashSet::new();
        for stage in &self.stages {
            let label = stage.label.trim();
            if label.is_empty() {
                return Err(PipelineValidationError::new("Stage label cannot be empty"));
            }
            for reference in stage.prompt.stage_references() {
                if !seen.contains(reference.as_str()) {
                    return Err(PipelineValidationError::new(format!(
                        "Stage '{}' references '{}' which does not run before it",
                        stage.label, reference
                    ))
                    .with_stages(vec![stage.label.clone(), reference]));
                }
            }
            if !seen.insert(label) {
                return Err(PipelineValidationError::new(format!(
                    "Duplicate stage label '{}'",
                    stage.label
                ))
                .with_stages(vec![stage.label.clone()]));
            }
        }
        Ok(())
    }

    /// Parses a pipeline from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] if the JSON does not describe a pipeline.
    pub fn from_json(source: &str, origin: &str) -> Result<Self, ConfigError> {
        let file: PipelineConfigFile =
            serde_json::from_str(source).map_err(|e| ConfigError::Parse {
                path: origin.to_string(),
                message: e.to_string(),
            })?;
        Ok(file.into())
    }

    /// Loads a pipeline from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the file cannot be read or parsed.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let display = path.display().to_string();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: display.clone(),
            source,
        })?;
        Self::from_json(&source, &display)
    }
}

impl From<PipelineConfigFile> for PipelineDefinition {
    fn from(file: PipelineConfigFile) -> Self {
        Self {
            name: file.name,
            stages: file.stages.into_iter().map(Into::into).collect(),
        }
    }
}
