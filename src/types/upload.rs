use serde::{Deserialize, Serialize};

/// Soft character limit for a knowledge block.
pub const MAX_KNOWLEDGE_CHARS: usize = 10_000;

/// Body of `POST /api/v1/essays/upload-text`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadTextRequest {
    /// The whole document, unchunked.
    pub content: String,
}

impl UploadTextRequest {
    /// Creates an upload request.
    pub fn new<S: Into<String>>(content: S) -> Self {
        Self {
            content: content.into(),
        }
    }
}
