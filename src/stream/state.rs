//! Lifecycle of a chat stream.

use std::fmt;

/// Where a chat stream is in its lifecycle.
///
/// `Closed` and `Errored` are terminal.  A new stream needs a new login and
/// a new [`ChatSession`](crate::ChatSession); nothing reconnects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    /// Constructed with a credential-scoped URL; handshake in progress.
    Connecting,
    /// Handshake done; frames flow both ways.
    Open,
    /// Terminated, normally or abnormally.
    Closed,
    /// Handshake or transport failure.
    Errored,
}

/// Something that happened to the underlying connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamSignal {
    /// The handshake completed.
    Opened,
    /// The connection ended.
    Closed,
    /// The handshake or the transport failed.
    Failed,
}

impl StreamSignal {
    /// The system notice shown when this signal changes the state.
    pub fn notice(self) -> &'static str {
        match self {
            StreamSignal::Opened => "Connected to AI",
            StreamSignal::Closed => "Disconnected",
            StreamSignal::Failed => "WebSocket error",
        }
    }
}

impl StreamState {
    /// The state after `signal`.
    pub fn on(self, signal: StreamSignal) -> StreamState {
        match (self, signal) {
            (StreamState::Connecting, StreamSignal::Opened) => StreamState::Open,
            (StreamState::Connecting | StreamState::Open, StreamSignal::Closed) => {
                StreamState::Closed
            }
            (StreamState::Connecting | StreamState::Open, StreamSignal::Failed) => {
                StreamState::Errored
            }
            (state, _) => state,
        }
    }

    /// True once the stream can never carry another frame.
    pub fn is_terminal(self) -> bool {
        matches!(self, StreamState::Closed | StreamState::Errored)
    }
}

impl fmt::Display for StreamState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamState::Connecting => write!(f, "connecting"),
            StreamState::Open => write!(f, "open"),
            StreamState::Closed => write!(f, "closed"),
            StreamState::Errored => write!(f, "errored"),
        }
    }
}
