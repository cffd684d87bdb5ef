// Public modules
pub mod chat_event;
pub mod chat_message;
pub mod credential;
pub mod login;
pub mod upload;

// Re-exports
pub use chat_event::ChatEvent;
pub use chat_message::{ChatMessage, ChatMode, PayloadShape};
pub use credential::Credential;
pub use login::{LoginRequest, LoginResponse};
pub use upload::{MAX_KNOWLEDGE_CHARS, UploadTextRequest};
