//! WebSocket protocol message types
//!
//! Frames are JSON objects discriminated by a `type` field. Parsing is split
//! by session phase because the two phases treat malformed input differently.

use serde::{Deserialize, Serialize};

/// Usage hint sent to every new connection before anything else
pub const REGISTER_HINT: &str = r#"Please register: { "type":"register", "name":"YourName" }"#;

/// Sender name used for chat from a session that never registered
pub const ANONYMOUS: &str = "Anonymous";

/// Messages sent from client to server
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// First-frame registration request
    Register {
        /// Candidate display name (trimmed before use)
        name: String,
    },

    /// Chat body
    Message {
        /// Message text
        text: String,
    },
}

/// Messages sent from server to client
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Informational notice (hint, welcome, join, leave)
    System {
        /// Notice text
        text: String,
    },

    /// Chat broadcast
    Message {
        /// Sender display name, or "Anonymous"
        name: String,
        /// Message text
        text: String,
    },

    /// Registration diagnostic, sent only to the offending connection
    Error {
        /// Diagnostic text
        text: String,
    },
}

impl ServerMessage {
    pub fn system(text: impl Into<String>) -> Self {
        Self::System { text: text.into() }
    }

    pub fn chat(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self::Message {
            name: name.into(),
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self::Error { text: text.into() }
    }

    pub fn welcome(name: &str) -> Self {
        Self::system(format!("Welcome, {}!", name))
    }

    pub fn joined(name: &str) -> Self {
        Self::system(format!("User {} joined", name))
    }

    pub fn left(name: &str) -> Self {
        Self::system(format!("User {} left", name))
    }
}

/// Why a first frame was rejected as a registration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationRejection {
    /// The frame was not JSON at all
    InvalidJson,
    /// Valid JSON, but not a register request with a usable name
    InvalidShape,
}

impl RegistrationRejection {
    /// Text of the `error` frame reported to the client
    pub fn message(self) -> &'static str {
        match self {
            Self::InvalidJson => "Invalid JSON in register message",
            Self::InvalidShape => "Invalid register message",
        }
    }
}

/// Parse the first frame of a session as a registration request.
///
/// Returns the trimmed display name on success.
pub fn parse_registration(text: &str) -> Result<String, RegistrationRejection> {
    let value: serde_json::Value =
        serde_json::from_str(text).map_err(|_| RegistrationRejection::InvalidJson)?;

    match client_message(value) {
        Some(ClientMessage::Register { name }) => {
            let name = name.trim();
            if name.is_empty() {
                Err(RegistrationRejection::InvalidShape)
            } else {
                Ok(name.to_string())
            }
        }
        _ => Err(RegistrationRejection::InvalidShape),
    }
}

/// Parse a frame received after the registration attempt.
///
/// Text that is not JSON is taken verbatim as a chat body. JSON that is not a
/// chat message yields `None` and is dropped by the caller.
pub fn parse_chat(text: &str) -> Option<String> {
    let Ok(value) = serde_json::from_str::<serde_json::Value>(text) else {
        return Some(text.to_string());
    };

    match client_message(value) {
        Some(ClientMessage::Message { text }) => Some(text),
        _ => None,
    }
}

/// Only JSON objects count as messages; serde would otherwise accept
/// tagged enums encoded as arrays.
fn client_message(value: serde_json::Value) -> Option<ClientMessage> {
    if !value.is_object() {
        return None;
    }
    serde_json::from_value(value).ok()
}
