// Public modules
pub mod chat;
pub mod client;
pub mod error;
pub mod frame;
pub mod observability;
pub mod session_logger;
pub mod stream;
pub mod types;

// Re-exports
pub use client::{Backend, DEFAULT_BASE_URL, Endpoints, HttpBackend};
pub use error::{Error, Result};
pub use frame::{FrameRejection, FrameValidation, MISSING_FIELD_PLACEHOLDER, decode_frame};
pub use observability::register_biometrics;
pub use session_logger::{SessionLogger, TracingSessionLogger};
pub use stream::{
    ChatSession, Connector, SendOutcome, SessionEvent, SessionPolicy, StreamSignal, StreamState,
    Transport, WebSocketConnector, WebSocketTransport,
};
pub use types::*;
