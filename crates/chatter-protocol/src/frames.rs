use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::FrameError;

/// Server → Client envelope.
///
/// Wire:
/// - `{ "type": "name", "name": "Alice742" }` — once, right after connect
/// - `{ "type": "message", "name": "Alice742", "message": "hi", "isSelf": true }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ServerFrame {
    Name {
        name: String,
    },
    Message {
        name: String,
        message: String,
        #[serde(rename = "isSelf")]
        is_self: bool,
    },
}

impl ServerFrame {
    pub fn name(name: impl Into<String>) -> Self {
        Self::Name { name: name.into() }
    }

    pub fn message(sender: impl Into<String>, text: impl Into<String>, is_self: bool) -> Self {
        Self::Message {
            name: sender.into(),
            message: text.into(),
            is_self,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Client → Server chat message.
/// Wire: `{ "message": "hi" }`. Any other fields are ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientFrame {
    pub message: String,
}

impl ClientFrame {
    /// Parse and validate a text payload. Fails closed on any shape mismatch.
    pub fn parse(text: &str) -> Result<Self, FrameError> {
        let value: Value = serde_json::from_str(text).map_err(FrameError::Malformed)?;
        let Value::Object(mut map) = value else {
            return Err(FrameError::NotAnObject);
        };

        match map.remove("message") {
            Some(Value::String(message)) => Ok(Self { message }),
            Some(_) => Err(FrameError::InvalidField {
                field: "message",
                expected: "string",
            }),
            None => Err(FrameError::MissingField { field: "message" }),
        }
    }

    /// Parse a raw payload, rejecting it when larger than `max_bytes` or not UTF-8.
    pub fn parse_bytes(raw: &[u8], max_bytes: usize) -> Result<Self, FrameError> {
        if raw.len() > max_bytes {
            return Err(FrameError::TooLarge {
                size: raw.len(),
                max: max_bytes,
            });
        }
        let text = std::str::from_utf8(raw).map_err(|_| FrameError::InvalidUtf8)?;
        Self::parse(text)
    }
}
