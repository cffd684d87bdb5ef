//! Decoding of inbound chat stream frames.
//!
//! Every text frame from the stream is expected to be a JSON object with
//! `timestamp`, `query`, and `data` string fields.  How strictly that is
//! enforced is a policy choice; see [`FrameValidation`].

use std::fmt;

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::types::ChatEvent;

/// Placeholder rendered for absent fields under [`FrameValidation::Lenient`].
pub const MISSING_FIELD_PLACEHOLDER: &str = "undefined";

/// How inbound frames with missing fields are treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FrameValidation {
    /// Drop frames where any of the three fields is absent or empty.
    #[default]
    Strict,
    /// Render whatever arrived; absent fields show as `undefined`.
    ///
    /// Only absence is tolerated.  A field holding a number, boolean, array,
    /// or object still rejects the frame as
    /// [`Malformed`](FrameRejection::Malformed).  An explicit `null` counts
    /// as absent and renders as `undefined`.
    Lenient,
}

/// Why a frame was not turned into a [`ChatEvent`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameRejection {
    /// Not JSON, not an object, or a field of the wrong type.
    Malformed(String),
    /// A required field was absent or empty.
    MissingField(&'static str),
}

impl fmt::Display for FrameRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameRejection::Malformed(reason) => write!(f, "malformed frame: {reason}"),
            FrameRejection::MissingField(field) => write!(f, "frame missing field: {field}"),
        }
    }
}

#[derive(Deserialize)]
struct RawFrame {
    timestamp: Option<String>,
    query: Option<String>,
    data: Option<String>,
}

/// Decode one text frame into a chat turn.
pub fn decode_frame(text: &str, validation: FrameValidation) -> Result<ChatEvent, FrameRejection> {
    // Parse as a map first so that arrays never deserialize positionally.
    let object: Map<String, Value> =
        serde_json::from_str(text).map_err(|e| FrameRejection::Malformed(e.to_string()))?;
    let raw: RawFrame = serde_json::from_value(Value::Object(object))
        .map_err(|e| FrameRejection::Malformed(e.to_string()))?;
    match validation {
        FrameValidation::Strict => Ok(ChatEvent {
            timestamp: required("timestamp", raw.timestamp)?,
            query: required("query", raw.query)?,
            data: required("data", raw.data)?,
        }),
        FrameValidation::Lenient => Ok(ChatEvent {
            timestamp: or_placeholder(raw.timestamp),
            query: or_placeholder(raw.query),
            data: or_placeholder(raw.data),
        }),
    }
}

fn required(field: &'static str, value: Option<String>) -> Result<String, FrameRejection> {
    match value {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(FrameRejection::MissingField(field)),
    }
}

fn or_placeholder(value: Option<String>) -> String {
    value.unwrap_or_else(|| MISSING_FIELD_PLACEHOLDER.to_string())
}
