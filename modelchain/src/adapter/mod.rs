//! Multi-family model adapter.
//!
//! Bedrock models from different vendors take different JSON bodies and
//! answer in different envelopes. The adapter turns one uniform
//! `(system prompt, user text)` request into the right body, sends it through
//! a [`Transport`], and reads the text back out.

mod family;
mod payload;
mod response;

pub use family::{classify, ModelFamily};
pub use payload::{
    build_payload, ClaudeMessage, ClaudeRequest, NovaInferenceConfig, NovaMessage, NovaRequest,
    NovaText, TitanGenerationConfig, TitanRequest, WirePayload, ANTHROPIC_VERSION, MAX_TOKENS,
    TEMPERATURE,
};
pub use response::{extract_text, parse_response, WireResponse};

use crate::errors::{ModelchainError, UnsupportedModelError};
use crate::transport::{Transport, JSON_CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A uniform model request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    /// System prompt; may be empty.
    pub system_prompt: String,
    /// The user turn.
    pub user_text: String,
}

impl Request {
    /// Creates a request with no system prompt.
    #[must_use]
    pub fn new(user_text: impl Into<String>) -> Self {
        Self {
            system_prompt: String::new(),
            user_text: user_text.into(),
        }
    }

    /// Sets the system prompt.
    #[must_use]
    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = system_prompt.into();
        self
    }
}

/// Sends `payload` to `model_id` and parses the reply.
///
/// # Errors
///
/// Transport failures come back unchanged as [`ModelchainError::Transport`].
/// A reply that is not JSON is a [`ModelchainError::EmptyResponse`].
pub fn invoke<T: Transport + ?Sized>(
    transport: &T,
    model_id: &str,
    payload: &WirePayload,
) -> Result<WireResponse, ModelchainError> {
    let body = payload.to_bytes()?;
    debug!(model_id, family = %payload.family(), request_bytes = body.len(), "Invoking model");

    let reply = transport.invoke(model_id, JSON_CONTENT_TYPE, &body)?;
    debug!(model_id, response_bytes = reply.len(), "Model replied");

    Ok(parse_response(model_id, &reply)?)
}

/// A model id bound to its family.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelAdapter {
    model_id: String,
    family: ModelFamily,
}

impl ModelAdapter {
    /// Classifies `model_id` and binds it.
    ///
    /// # Errors
    ///
    /// Returns [`UnsupportedModelError`] for ids outside the known families.
    pub fn new(model_id: impl Into<String>) -> Result<Self, UnsupportedModelError> {
        let model_id = model_id.into();
        let family = classify(&model_id)?;
        Ok(Self { model_id, family })
    }

    /// Returns the model id.
    #[must_use]
    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    /// Returns the resolved family.
    #[must_use]
    pub const fn family(&self) -> ModelFamily {
        self.family
    }

    /// Builds the wire payload for a request.
    #[must_use]
    pub fn payload(&self, request: &Request) -> WirePayload {
        build_payload(self.family, &request.system_prompt, &request.user_text)
    }

    /// Runs one request end to end and returns the reply text.
    ///
    /// # Errors
    ///
    /// Returns a transport, empty-response or serialization error.
    pub fn complete<T: Transport + ?Sized>(
        &self,
        transport: &T,
        request: &Request,
    ) -> Result<String, ModelchainError> {
        let response = invoke(transport, &self.model_id, &self.payload(request))?;
        Ok(extract_text(self.family, &self.model_id, &response)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::TransportError;
    use crate::transport::MockTransport;
    use mockall::predicate::eq;
    use serde_json::json;

    #[test]
    fn test_adapter_rejects_unknown_model() {
        let err = ModelAdapter::new("mistral.mistral-7b-instruct-v0:2").unwrap_err();
        assert_eq!(err.model_id, "mistral.mistral-7b-instruct-v0:2");
    }

    #[test]
    fn test_complete_sends_family_payload() {
        let adapter = ModelAdapter::new("anthropic.claude-3-haiku-20240307-v1:0").unwrap();
        let request = Request::new("Write code").with_system_prompt("You are a developer.");
        let expected_body = adapter.payload(&request).to_bytes().unwrap();

        let mut transport = MockTransport::new();
        transport
            .expect_invoke()
            .with(
                eq("anthropic.claude-3-haiku-20240307-v1:0"),
                eq("application/json"),
                eq(expected_body),
            )
            .times(1)
            .returning(|_, _, _| {
                Ok(serde_json::to_vec(&json!({"content": [{"text": "fn main() {}"}]})).unwrap())
            });

        let text = adapter.complete(&transport, &request).unwrap();
        assert_eq!(text, "fn main() {}");
    }

    #[test]
    fn test_transport_error_passes_through() {
        let adapter = ModelAdapter::new("amazon.nova-lite-v1:0").unwrap();
        let mut transport = MockTransport::new();
        transport
            .expect_invoke()
            .returning(|_, _, _| Err(TransportError::new("ThrottlingException: slow down")));

        let err = adapter.complete(&transport, &Request::new("hi")).unwrap_err();
        match err {
            ModelchainError::Transport(inner) => {
                assert_eq!(inner.message, "ThrottlingException: slow down");
            }
            other => panic!("expected transport error, got {other:?}"),
        }
    }

    #[test]
    fn test_malformed_reply_is_empty_response() {
        let adapter = ModelAdapter::new("amazon.titan-text-express-v1").unwrap();
        let mut transport = MockTransport::new();
        transport
            .expect_invoke()
            .returning(|_, _, _| Ok(b"{\"inputTextTokenCount\": 4}".to_vec()));

        let err = adapter.complete(&transport, &Request::new("hi")).unwrap_err();
        assert!(matches!(err, ModelchainError::EmptyResponse(_)));
    }

    #[test]
    fn test_invoke_returns_parsed_value() {
        let payload = build_payload(ModelFamily::Nova, "", "hello");
        let mut transport = MockTransport::new();
        transport
            .expect_invoke()
            .returning(|_, _, _| Ok(b"{\"ok\": true}".to_vec()));

        let response = invoke(&transport, "amazon.nova-lite-v1:0", &payload).unwrap();
        assert_eq!(response, json!({"ok": true}));
    }
}
