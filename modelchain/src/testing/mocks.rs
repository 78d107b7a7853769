//! Transports for tests and dry runs.

use parking_lot::Mutex;
use serde_json::Value;
use std::collections::VecDeque;

use super::fixtures::reply_for;
use crate::adapter::{classify, WirePayload};
use crate::errors::TransportError;
use crate::transport::Transport;

/// One call seen by a [`ScriptedTransport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    /// Model the call targeted.
    pub model_id: String,
    /// Declared content type.
    pub content_type: String,
    /// Raw request body.
    pub body: Vec<u8>,
}

impl RecordedCall {
    /// The request body as a payload, if it parses as one.
    #[must_use]
    pub fn payload(&self) -> Option<WirePayload> {
        serde_json::from_slice(&self.body).ok()
    }

    /// The request body as plain JSON.
    #[must_use]
    pub fn json(&self) -> Option<Value> {
        serde_json::from_slice(&self.body).ok()
    }

    /// The user text that was sent, or an empty string.
    #[must_use]
    pub fn user_text(&self) -> String {
        self.payload()
            .map(|p| p.user_text().to_string())
            .unwrap_or_default()
    }
}

/// A transport that answers from a queue, in order.
///
/// Each call pops the next scripted outcome. Once the queue is empty every
/// call fails.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    script: Mutex<VecDeque<Result<Value, TransportError>>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedTransport {
    /// Creates a transport with an empty script.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a successful reply.
    #[must_use]
    pub fn reply(self, body: Value) -> Self {
        self.script.lock().push_back(Ok(body));
        self
    }

    /// Queues a failure.
    #[must_use]
    pub fn fail(self, error: TransportError) -> Self {
        self.script.lock().push_back(Err(error));
        self
    }

    /// Every call so far.
    #[must_use]
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }

    /// Number of calls so far.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    /// Outcomes not yet consumed.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.script.lock().len()
    }
}

impl Transport for ScriptedTransport {
    fn invoke(
        &self,
        model_id: &str,
        content_type: &str,
        body: &[u8],
    ) -> Result<Vec<u8>, TransportError> {
        self.calls.lock().push(RecordedCall {
            model_id: model_id.to_string(),
            content_type: content_type.to_string(),
            body: body.to_vec(),
        });

        let next = self
            .script
            .lock()
            .pop_front()
            .ok_or_else(|| TransportError::new(format!("No scripted reply left for {model_id}")))?;
        let value = next?;
        serde_json::to_vec(&value)
            .map_err(|e| TransportError::new("Could not encode scripted reply").with_source(e))
    }
}

/// A transport that answers every request with its own user text.
///
/// The reply is shaped for the family of the target model, so the adapter
/// reads it back like a real one.
#[derive(Debug, Clone, Default)]
pub struct EchoTransport {
    prefix: String,
}

impl EchoTransport {
    /// Echoes the user text unchanged.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Puts `prefix` in front of every echoed text.
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }
}

impl Transport for EchoTransport {
    fn invoke(
        &self,
        model_id: &str,
        _content_type: &str,
        body: &[u8],
    ) -> Result<Vec<u8>, TransportError> {
        let family = classify(model_id)
            .map_err(|e| TransportError::new(format!("Echo cannot answer: {e}")))?;
        let payload: WirePayload = serde_json::from_slice(body)
            .map_err(|e| TransportError::new("Echo received a malformed payload").with_source(e))?;

        let text = format!("{}{}", self.prefix, payload.user_text());
        serde_json::to_vec(&reply_for(family, &text))
            .map_err(|e| TransportError::new("Could not encode echo reply").with_source(e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::{build_payload, ModelFamily};
    use crate::testing::claude_reply;

    #[test]
    fn test_scripted_transport_pops_in_order() {
        let transport = ScriptedTransport::new()
            .reply(claude_reply("one"))
            .fail(TransportError::new("two"));

        assert!(transport.invoke("m", "application/json", b"{}").is_ok());
        let err = transport.invoke("m", "application/json", b"{}").unwrap_err();
        assert_eq!(err.to_string(), "two");
        assert_eq!(transport.call_count(), 2);
        assert_eq!(transport.remaining(), 0);
    }

    #[test]
    fn test_scripted_transport_exhausted() {
        let transport = ScriptedTransport::new();
        let err = transport.invoke("model-x", "application/json", b"{}").unwrap_err();
        assert!(err.to_string().contains("model-x"));
    }

    #[test]
    fn test_recorded_call_user_text() {
        let transport = ScriptedTransport::new().reply(claude_reply("ok"));
        let body = build_payload(ModelFamily::Nova, "sys", "hello nova")
            .to_bytes()
            .unwrap();
        transport.invoke("amazon.nova-lite-v1:0", "application/json", &body).unwrap();

        let calls = transport.calls();
        assert_eq!(calls[0].model_id, "amazon.nova-lite-v1:0");
        assert_eq!(calls[0].user_text(), "hello nova");
    }

    #[test]
    fn test_echo_prefix() {
        let transport = EchoTransport::new().with_prefix("[sim] ");
        let body = build_payload(ModelFamily::Titan, "", "ping").to_bytes().unwrap();
        let reply = transport
            .invoke("amazon.titan-text-express-v1", "application/json", &body)
            .unwrap();
        let value: Value = serde_json::from_slice(&reply).unwrap();
        assert_eq!(value["results"][0]["outputText"], "[sim] ping");
    }

    #[test]
    fn test_echo_rejects_unknown_model() {
        let err = EchoTransport::new()
            .invoke("meta.llama3", "application/json", b"{}")
            .unwrap_err();
        assert!(err.to_string().contains("meta.llama3"));
    }
}
