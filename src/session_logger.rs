//! Logging trait for chat stream traffic.
//!
//! This module provides the [`SessionLogger`] trait that lets callers capture
//! every frame passing through a [`ChatSession`](crate::ChatSession).  The
//! default, [`TracingSessionLogger`], writes to the `tracing` developer log;
//! nothing here is ever shown in the transcript.

use crate::frame::FrameRejection;
use crate::types::{ChatEvent, ChatMessage};

/// A trait for logging chat stream traffic.
///
/// # Example
///
/// ```rust,ignore
/// use ragchat::{ChatEvent, ChatMessage, FrameRejection, SessionLogger};
/// use std::sync::Mutex;
///
/// #[derive(Default)]
/// struct Recorder {
///     rejected: Mutex<Vec<String>>,
/// }
///
/// impl SessionLogger for Recorder {
///     fn log_outbound(&self, _: &ChatMessage) {}
///     fn log_event(&self, _: &ChatEvent) {}
///     fn log_rejected(&self, raw: &str, _: &FrameRejection) {
///         self.rejected.lock().unwrap().push(raw.to_string());
///     }
/// }
/// ```
pub trait SessionLogger: Send + Sync {
    /// Log a frame about to be transmitted.
    fn log_outbound(&self, message: &ChatMessage);

    /// Log an inbound frame that decoded into a chat turn.
    fn log_event(&self, event: &ChatEvent);

    /// Log an inbound frame that was dropped.
    ///
    /// `raw` is the frame text exactly as received.
    fn log_rejected(&self, raw: &str, rejection: &FrameRejection);
}

/// [`SessionLogger`] that forwards to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSessionLogger;

impl SessionLogger for TracingSessionLogger {
    fn log_outbound(&self, message: &ChatMessage) {
        tracing::debug!(
            chars = message.data.chars().count(),
            mode = ?message.mode,
            "sending chat frame"
        );
    }

    fn log_event(&self, event: &ChatEvent) {
        tracing::debug!(timestamp = %event.timestamp, "received chat turn");
    }

    fn log_rejected(&self, raw: &str, rejection: &FrameRejection) {
        tracing::warn!(frame = %raw, %rejection, "dropping inbound frame");
    }
}
