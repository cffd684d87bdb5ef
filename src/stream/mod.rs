//! The chat stream: lifecycle, transports, and the owned session.

pub mod memory;
mod session;
mod state;
mod transport;

pub use session::{ChatSession, SendOutcome, SessionEvent, SessionPolicy};
pub use state::{StreamSignal, StreamState};
pub use transport::{Connector, Transport, WebSocketConnector, WebSocketTransport};
