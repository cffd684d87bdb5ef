use serde::{Deserialize, Serialize};

/// A server-to-client chat turn.
///
/// Each inbound frame is one complete turn: the server echoes the user's
/// query and pairs it with the generated answer and a display timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatEvent {
    /// Display timestamp chosen by the server.
    pub timestamp: String,
    /// The user's query, echoed back.
    pub query: String,
    /// The generated response.
    pub data: String,
}

impl ChatEvent {
    /// Creates a chat event.
    pub fn new<T, Q, D>(timestamp: T, query: Q, data: D) -> Self
    where
        T: Into<String>,
        Q: Into<String>,
        D: Into<String>,
    {
        Self {
            timestamp: timestamp.into(),
            query: query.into(),
            data: data.into(),
        }
    }
}
