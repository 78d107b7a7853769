//! Run configuration.
//!
//! Values come from the environment (after the CLI has loaded `.env`) and can
//! be overridden by command-line flags.

use crate::errors::ConfigError;
use crate::pipeline::{PipelineDefinition, Preset};
use std::path::PathBuf;
use tracing::info;

/// Region used when `AWS_DEFAULT_REGION` is unset.
pub const DEFAULT_REGION: &str = "us-east-1";

/// Environment variable holding the AWS region.
pub const REGION_VAR: &str = "AWS_DEFAULT_REGION";
/// Environment variable selecting a preset.
pub const PRESET_VAR: &str = "MODELCHAIN_PRESET";
/// Environment variable pointing at a pipeline file.
pub const STAGES_FILE_VAR: &str = "MODELCHAIN_STAGES_FILE";
/// Environment variable holding the project request.
pub const REQUEST_VAR: &str = "PROJECT_REQUEST";

/// Settings for one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    /// AWS region.
    pub region: String,
    /// Built-in pipeline, used when no stages file is given.
    pub preset: Preset,
    /// JSON pipeline file, takes precedence over the preset.
    pub stages_file: Option<PathBuf>,
    /// Initial request; the preset's default when absent.
    pub project_request: Option<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            region: DEFAULT_REGION.to_string(),
            preset: Preset::default(),
            stages_file: None,
            project_request: None,
        }
    }
}

impl PipelineConfig {
    /// Creates a configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownPreset`] for a bad `MODELCHAIN_PRESET`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads settings through `lookup`; empty values count as unset.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownPreset`] for a bad preset name.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let mut config = Self::default();
        if let Some(region) = get(REGION_VAR) {
            config.region = region;
        }
        if let Some(preset) = get(PRESET_VAR) {
            config.preset = preset.parse()?;
        }
        config.stages_file = get(STAGES_FILE_VAR).map(PathBuf::from);
        config.project_request = get(REQUEST_VAR);
        Ok(config)
    }

    /// Sets the region.
    #[must_use]
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    /// Sets the preset.
    #[must_use]
    pub const fn with_preset(mut self, preset: Preset) -> Self {
        self.preset = preset;
        self
    }

    /// Makes `preset` the pipeline source, dropping any stages file.
    #[must_use]
    pub fn use_preset(mut self, preset: Preset) -> Self {
        self.preset = preset;
        self.stages_file = None;
        self
    }

    /// Sets the stages file.
    #[must_use]
    pub fn with_stages_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.stages_file = Some(path.into());
        self
    }

    /// Sets the project request.
    #[must_use]
    pub fn with_project_request(mut self, request: impl Into<String>) -> Self {
        self.project_request = Some(request.into());
        self
    }

    /// The request the first stage will see.
    #[must_use]
    pub fn request(&self) -> &str {
        self.project_request
            .as_deref()
            .unwrap_or_else(|| self.preset.default_request())
    }

    /// Loads the stages file, or builds the preset.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the stages file cannot be loaded.
    pub fn pipeline(&self) -> Result<PipelineDefinition, ConfigError> {
        match &self.stages_file {
            Some(path) => PipelineDefinition::from_json_file(path),
            None => Ok(self.preset.definition()),
        }
    }
}

/// Name of the variable that overrides the model of stage `label`.
///
/// `Architecture` reads `ARCHITECTURE_MODEL`; `Code Review` reads
/// `CODE_REVIEW_MODEL`.
#[must_use]
pub fn model_override_var(label: &str) -> String {
    let mut name: String = label
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect();
    name.push_str("_MODEL");
    name
}

/// Applies `<LABEL>_MODEL` overrides found through `lookup`.
///
/// Returns the `(label, model_id)` pairs that were changed.
pub fn apply_model_overrides<F>(
    pipeline: &mut PipelineDefinition,
    lookup: F,
) -> Vec<(String, String)>
where
    F: Fn(&str) -> Option<String>,
{
    let overrides: Vec<(String, String)> = pipeline
        .stages()
        .iter()
        .filter_map(|stage| {
            lookup(&model_override_var(&stage.label))
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty() && *v != stage.model_id)
                .map(|model_id| (stage.label.clone(), model_id))
        })
        .collect();

    for (label, model_id) in &overrides {
        info!(stage = %label, model_id = %model_id, "Model overridden from environment");
        pipeline.set_model(label, model_id.clone());
    }
    overrides
}
