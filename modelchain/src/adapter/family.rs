//! Model family resolution.

use crate::errors::UnsupportedModelError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The wire schema family a Bedrock model belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelFamily {
    /// Anthropic Claude messages API.
    Claude,
    /// Amazon Titan text generation.
    Titan,
    /// Amazon Nova converse-style messages.
    Nova,
}

impl ModelFamily {
    /// All families, in classification order.
    pub const ALL: [Self; 3] = [Self::Claude, Self::Titan, Self::Nova];

    /// The substring of a model id that marks this family.
    #[must_use]
    pub const fn marker(self) -> &'static str {
        match self {
            Self::Claude => "anthropic.claude",
            Self::Titan => "amazon.titan",
            Self::Nova => "amazon.nova",
        }
    }

    /// Whether the family accepts a system prompt.
    #[must_use]
    pub const fn supports_system_prompt(self) -> bool {
        !matches!(self, Self::Titan)
    }
}

impl fmt::Display for ModelFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Claude => write!(f, "claude"),
            Self::Titan => write!(f, "titan"),
            Self::Nova => write!(f, "nova"),
        }
    }
}

/// Resolves the family of a model identifier.
///
/// Matching is by substring so that regional inference profiles
/// (`us.anthropic.claude-...`) resolve like the bare model ids.
///
/// # Errors
///
/// Returns [`UnsupportedModelError`] when no family marker is present.
pub fn classify(model_id: &str) -> Result<ModelFamily, UnsupportedModelError> {
    ModelFamily::ALL
        .into_iter()
        .find(|family| model_id.contains(family.marker()))
        .ok_or_else(|| UnsupportedModelError::new(model_id))
}
