//! Family-specific request bodies.

use super::ModelFamily;
use crate::errors::ModelchainError;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Version marker Bedrock requires on Anthropic message requests.
pub const ANTHROPIC_VERSION: &str = "bedrock-2023-05-31";

/// Output token ceiling sent with every request.
pub const MAX_TOKENS: u32 = 4000;

/// Sampling temperature for families that accept one.
pub const TEMPERATURE: f64 = 0.7;

/// Serialized request body for one model family.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WirePayload {
    /// Anthropic messages body.
    Claude(ClaudeRequest),
    /// Titan text generation body.
    Titan(TitanRequest),
    /// Nova messages body.
    Nova(NovaRequest),
}

impl WirePayload {
    /// Returns the family this payload was built for.
    #[must_use]
    pub const fn family(&self) -> ModelFamily {
        match self {
            Self::Claude(_) => ModelFamily::Claude,
            Self::Titan(_) => ModelFamily::Titan,
            Self::Nova(_) => ModelFamily::Nova,
        }
    }

    /// Returns the user text carried by the payload.
    #[must_use]
    pub fn user_text(&self) -> &str {
        match self {
            Self::Claude(req) => req.messages.first().map_or("", |m| m.content.as_str()),
            Self::Titan(req) => &req.input_text,
            Self::Nova(req) => req
                .messages
                .first()
                .and_then(|m| m.content.first())
                .map_or("", |c| c.text.as_str()),
        }
    }

    /// Serializes the payload to JSON bytes.
    ///
    /// # Errors
    ///
    /// Returns a serialization error if the body cannot be encoded.
    pub fn to_bytes(&self) -> Result<Vec<u8>, ModelchainError> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Converts the payload to a JSON value.
    ///
    /// # Errors
    ///
    /// Returns a serialization error if the body cannot be encoded.
    pub fn to_value(&self) -> Result<serde_json::Value, ModelchainError> {
        Ok(serde_json::to_value(self)?)
    }
}

/// Anthropic messages request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaudeRequest {
    /// API version marker.
    pub anthropic_version: String,
    /// Output token ceiling.
    pub max_tokens: u32,
    /// Conversation turns.
    pub messages: Vec<ClaudeMessage>,
    /// System prompt, omitted when empty.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
}

/// A single Anthropic message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaudeMessage {
    /// Speaker role.
    pub role: String,
    /// Plain text content.
    pub content: String,
}

/// Titan text generation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TitanRequest {
    /// The prompt.
    pub input_text: String,
    /// Sampling settings.
    pub text_generation_config: TitanGenerationConfig,
}

/// Titan sampling settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TitanGenerationConfig {
    /// Output token ceiling.
    pub max_token_count: u32,
    /// Sampling temperature.
    pub temperature: f64,
}

/// Nova messages request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NovaRequest {
    /// Conversation turns.
    pub messages: Vec<NovaMessage>,
    /// Sampling settings.
    pub inference_config: NovaInferenceConfig,
    /// System blocks, omitted when the prompt is empty.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<Vec<NovaText>>,
}

/// A single Nova message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NovaMessage {
    /// Speaker role.
    pub role: String,
    /// Content blocks.
    pub content: Vec<NovaText>,
}

/// A Nova text block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NovaText {
    /// The text.
    pub text: String,
}

/// Nova sampling settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NovaInferenceConfig {
    /// Output token ceiling.
    pub max_tokens: u32,
    /// Sampling temperature.
    pub temperature: f64,
}

/// Builds the request body for `family`.
///
/// An empty system prompt never reaches the wire: the `system` field is left
/// out instead. Titan has no system prompt slot, so it is dropped there.
#[must_use]
pub fn build_payload(family: ModelFamily, system_prompt: &str, user_text: &str) -> WirePayload {
    let system = (!system_prompt.is_empty()).then(|| system_prompt.to_string());

    match family {
        ModelFamily::Claude => WirePayload::Claude(ClaudeRequest {
            anthropic_version: ANTHROPIC_VERSION.to_string(),
            max_tokens: MAX_TOKENS,
            messages: vec![ClaudeMessage {
                role: "user".to_string(),
                content: user_text.to_string(),
            }],
            system,
        }),
        ModelFamily::Titan => {
            if system.is_some() {
                debug!(family = %family, "System prompt not supported, dropping it");
            }
            WirePayload::Titan(TitanRequest {
                input_text: user_text.to_string(),
                text_generation_config: TitanGenerationConfig {
                    max_token_count: MAX_TOKENS,
                    temperature: TEMPERATURE,
                },
            })
        }
        ModelFamily::Nova => WirePayload::Nova(NovaRequest {
            messages: vec![NovaMessage {
                role: "user".to_string(),
                content: vec![NovaText {
                    text: user_text.to_string(),
                }],
            }],
            inference_config: NovaInferenceConfig {
                max_tokens: MAX_TOKENS,
                temperature: TEMPERATURE,
            },
            system: system.map(|text| vec![NovaText { text }]),
        }),
    }
}
