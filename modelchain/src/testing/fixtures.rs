//! Reply bodies in each family's response envelope.

use crate::adapter::ModelFamily;
use serde_json::{json, Value};

/// A Claude messages reply carrying `text`.
#[must_use]
pub fn claude_reply(text: &str) -> Value {
    json!({
        "id": "msg_test",
        "type": "message",
        "role": "assistant",
        "content": [{"type": "text", "text": text}],
        "stop_reason": "end_turn",
    })
}

/// A Titan text reply carrying `text`.
#[must_use]
pub fn titan_reply(text: &str) -> Value {
    json!({
        "inputTextTokenCount": 0,
        "results": [{
            "tokenCount": 0,
            "outputText": text,
            "completionReason": "FINISH",
        }],
    })
}

/// A Nova converse reply carrying `text`.
#[must_use]
pub fn nova_reply(text: &str) -> Value {
    json!({
        "output": {
            "message": {
                "role": "assistant",
                "content": [{"text": text}],
            }
        },
        "stopReason": "end_turn",
    })
}

/// The reply `family` would send for `text`.
#[must_use]
pub fn reply_for(family: ModelFamily, text: &str) -> Value {
    match family {
        ModelFamily::Claude => claude_reply(text),
        ModelFamily::Titan => titan_reply(text),
        ModelFamily::Nova => nova_reply(text),
    }
}
