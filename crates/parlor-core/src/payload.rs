//! Wire payload types.
//!
//! Chat messages and typing signals travel as small JSON documents. The
//! shapes here mirror what the service actually carries; anything else a
//! channel delivers is rejected per item with a [`PayloadError`] and the
//! batch continues.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::PayloadError;

/// Payload kind tag for chat messages.
const CHAT_KIND: &str = "chat";

/// Payload kind tag for typing signals.
const TYPING_KIND: &str = "typing";

/// A chat message body: `{"content": {"type": "chat", "text": ...}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatPayload {
    /// Message content envelope.
    pub content: ChatContent,
}

/// Inner content of a chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatContent {
    /// Content discriminator; `"chat"` for plain text messages.
    #[serde(rename = "type")]
    pub kind: String,

    /// The message text.
    pub text: String,
}

impl ChatPayload {
    /// Build a plain text chat payload.
    pub fn new(text: impl Into<String>) -> Self {
        Self { content: ChatContent { kind: CHAT_KIND.to_owned(), text: text.into() } }
    }

    /// Decode a chat payload from raw JSON.
    ///
    /// # Errors
    ///
    /// [`PayloadError::Malformed`] when the JSON shape does not match, and
    /// [`PayloadError::UnsupportedKind`] when the content declares a kind
    /// other than `"chat"`.
    pub fn from_value(value: &Value) -> Result<Self, PayloadError> {
        let payload: Self = serde_json::from_value(value.clone())?;
        if payload.content.kind != CHAT_KIND {
            return Err(PayloadError::UnsupportedKind(payload.content.kind));
        }
        Ok(payload)
    }

    /// Encode to the JSON value the service transports.
    pub fn to_value(&self) -> Value {
        // Serializing a struct of strings cannot fail.
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    /// The message text.
    pub fn text(&self) -> &str {
        &self.content.text
    }
}

/// A lightweight signal body: `{"type": "typing"}`.
///
/// Signals are the service's non-persisted message variant; this client
/// only uses them for typing indicators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalPayload {
    /// Signal discriminator.
    #[serde(rename = "type")]
    pub kind: String,
}

impl SignalPayload {
    /// Build a typing-indicator signal.
    pub fn typing() -> Self {
        Self { kind: TYPING_KIND.to_owned() }
    }

    /// Decode a signal payload from raw JSON.
    ///
    /// # Errors
    ///
    /// [`PayloadError::Malformed`] when the JSON shape does not match.
    pub fn from_value(value: &Value) -> Result<Self, PayloadError> {
        Ok(serde_json::from_value(value.clone())?)
    }

    /// Encode to the JSON value the service transports.
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    /// Whether this signal announces typing activity.
    pub fn is_typing(&self) -> bool {
        self.kind == TYPING_KIND
    }
}
