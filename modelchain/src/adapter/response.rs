//! Reply parsing.

use super::ModelFamily;
use crate::errors::EmptyResponseError;

/// Parsed reply body as returned by the transport.
pub type WireResponse = serde_json::Value;

impl ModelFamily {
    /// JSON pointer to the reply text for this family.
    #[must_use]
    pub const fn text_pointer(self) -> &'static str {
        match self {
            Self::Claude => "/content/0/text",
            Self::Titan => "/results/0/outputText",
            Self::Nova => "/output/message/content/0/text",
        }
    }
}

/// Parses raw reply bytes into a [`WireResponse`].
///
/// # Errors
///
/// Bytes that are not JSON count as an empty response.
pub fn parse_response(model_id: &str, body: &[u8]) -> Result<WireResponse, EmptyResponseError> {
    serde_json::from_slice(body)
        .map_err(|e| EmptyResponseError::new(model_id, format!("malformed JSON: {e}")))
}

/// Pulls the first text field out of a reply.
///
/// # Errors
///
/// Returns [`EmptyResponseError`] when the path is absent, not a string, or empty.
pub fn extract_text(
    family: ModelFamily,
    model_id: &str,
    response: &WireResponse,
) -> Result<String, EmptyResponseError> {
    let pointer = family.text_pointer();
    match response.pointer(pointer) {
        Some(serde_json::Value::String(text)) if !text.is_empty() => Ok(text.clone()),
        Some(serde_json::Value::String(_)) => {
            Err(EmptyResponseError::new(model_id, format!("{pointer} is empty")))
        }
        Some(_) => Err(EmptyResponseError::new(
            model_id,
            format!("{pointer} is not a string"),
        )),
        None => Err(EmptyResponseError::new(model_id, format!("{pointer} is missing"))),
    }
}
