use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Server-side hint selecting how a chat message is answered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatMode {
    /// Conversational memory only.
    #[default]
    Context,
    /// Retrieval-augmented: consult the knowledge store.
    Rag,
}

impl fmt::Display for ChatMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChatMode::Context => write!(f, "context"),
            ChatMode::Rag => write!(f, "rag"),
        }
    }
}

impl FromStr for ChatMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "context" => Ok(ChatMode::Context),
            "rag" => Ok(ChatMode::Rag),
            _ => Err(format!("unknown chat mode: {s} (use context or rag)")),
        }
    }
}

/// Shape of the outbound JSON frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadShape {
    /// `{"data": ...}`
    DataOnly,
    /// `{"data": ..., "mode": ...}`
    WithMode,
}

/// A client-to-server chat frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// The user's message text.
    pub data: String,

    /// Answering mode; omitted from the wire when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<ChatMode>,
}

impl ChatMessage {
    /// Builds the frame for `text` in the given payload shape.
    pub fn new<S: Into<String>>(text: S, mode: ChatMode, shape: PayloadShape) -> Self {
        let mode = match shape {
            PayloadShape::DataOnly => None,
            PayloadShape::WithMode => Some(mode),
        };
        Self {
            data: text.into(),
            mode,
        }
    }
}
