//! An owned chat stream session.

use std::collections::VecDeque;
use std::sync::Arc;

use url::Url;

use crate::error::Result;
use crate::frame::{FrameValidation, decode_frame};
use crate::observability::{
    FRAMES_RECEIVED, FRAMES_REJECTED, FRAMES_SENT, SENDS_DROPPED, STREAM_CONNECTS, STREAM_ERRORS,
};
use crate::session_logger::{SessionLogger, TracingSessionLogger};
use crate::stream::state::{StreamSignal, StreamState};
use crate::stream::transport::{Connector, Transport};
use crate::types::{ChatEvent, ChatMessage, ChatMode, PayloadShape};

/// How a session encodes outbound and validates inbound frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionPolicy {
    /// Inbound frame validation.
    pub validation: FrameValidation,
    /// Outbound payload shape.
    pub payload: PayloadShape,
}

impl Default for SessionPolicy {
    fn default() -> Self {
        Self {
            validation: FrameValidation::Strict,
            payload: PayloadShape::DataOnly,
        }
    }
}

/// Something to show in the transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// A lifecycle notice such as "Connected to AI".
    Notice(String),
    /// A complete chat turn from the server.
    Turn(ChatEvent),
}

/// Result of [`ChatSession::send`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// One frame was transmitted.
    Sent,
    /// The stream was not open; nothing was transmitted.
    Dropped,
}

/// One chat stream, from handshake to termination.
///
/// The session owns its transport.  Lifecycle notices are queued and handed
/// out by [`next_event`](Self::next_event) ahead of inbound turns, so the
/// caller sees them in the order they happened.
pub struct ChatSession<T: Transport> {
    url: Url,
    state: StreamState,
    transport: Option<T>,
    policy: SessionPolicy,
    logger: Arc<dyn SessionLogger>,
    pending: VecDeque<SessionEvent>,
}

impl<T: Transport + 'static> ChatSession<T> {
    /// Open a stream to `url` and wait for the handshake.
    ///
    /// The session is `Connecting` until the handshake resolves; on return it
    /// is either `Open` or `Errored`, with the matching notice queued.
    pub async fn connect<C>(connector: &C, url: Url, policy: SessionPolicy) -> Self
    where
        C: Connector<Transport = T>,
    {
        Self::connect_with_logger(connector, url, policy, Arc::new(TracingSessionLogger)).await
    }

    /// Like [`connect`](Self::connect), with a custom frame logger.
    pub async fn connect_with_logger<C>(
        connector: &C,
        url: Url,
        policy: SessionPolicy,
        logger: Arc<dyn SessionLogger>,
    ) -> Self
    where
        C: Connector<Transport = T>,
    {
        let mut session = Self {
            url,
            state: StreamState::Connecting,
            transport: None,
            policy,
            logger,
            pending: VecDeque::new(),
        };
        STREAM_CONNECTS.click();
        match connector.connect(&session.url).await {
            Ok(transport) => {
                session.transport = Some(transport);
                session.signal(StreamSignal::Opened);
            }
            Err(err) => {
                tracing::warn!(error = %err, "chat stream handshake failed");
                STREAM_ERRORS.click();
                session.signal(StreamSignal::Failed);
            }
        }
        session
    }
}

impl<T: Transport> ChatSession<T> {
    /// The current lifecycle state.
    pub fn state(&self) -> StreamState {
        self.state
    }

    /// True while frames can be sent.
    pub fn is_open(&self) -> bool {
        self.state == StreamState::Open
    }

    /// True once the stream is over and every notice has been handed out.
    pub fn is_finished(&self) -> bool {
        self.transport.is_none() && self.pending.is_empty()
    }

    /// The stream URL, including its `token` parameter.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// The framing policy.
    pub fn policy(&self) -> SessionPolicy {
        self.policy
    }

    /// Send one chat message.
    ///
    /// Does nothing unless the stream is `Open`.  There is no queue and no
    /// acknowledgement; a transport failure moves the session to `Errored`.
    pub async fn send(&mut self, text: &str, mode: ChatMode) -> Result<SendOutcome> {
        let transport = match (self.state, self.transport.as_mut()) {
            (StreamState::Open, Some(transport)) => transport,
            _ => {
                tracing::debug!(state = %self.state, "dropping send on inactive stream");
                SENDS_DROPPED.click();
                return Ok(SendOutcome::Dropped);
            }
        };
        let message = ChatMessage::new(text, mode, self.policy.payload);
        let frame = serde_json::to_string(&message)?;
        self.logger.log_outbound(&message);
        match transport.send_text(frame).await {
            Ok(()) => {
                FRAMES_SENT.click();
                Ok(SendOutcome::Sent)
            }
            Err(err) => {
                STREAM_ERRORS.click();
                self.transport = None;
                self.signal(StreamSignal::Failed);
                Err(err)
            }
        }
    }

    /// Wait for the next thing to show.
    ///
    /// Queued notices come first.  Inbound frames that fail validation are
    /// logged and skipped without affecting the stream.  Returns `None` once
    /// the stream is over and every notice has been handed out.
    pub async fn next_event(&mut self) -> Option<SessionEvent> {
        loop {
            if let Some(event) = self.pending.pop_front() {
                return Some(event);
            }
            let transport = self.transport.as_mut()?;
            match transport.next_text().await {
                Some(Ok(text)) => {
                    FRAMES_RECEIVED.click();
                    match decode_frame(&text, self.policy.validation) {
                        Ok(event) => {
                            self.logger.log_event(&event);
                            return Some(SessionEvent::Turn(event));
                        }
                        Err(rejection) => {
                            FRAMES_REJECTED.click();
                            self.logger.log_rejected(&text, &rejection);
                        }
                    }
                }
                Some(Err(err)) => {
                    tracing::warn!(error = %err, "chat stream failed");
                    STREAM_ERRORS.click();
                    self.transport = None;
                    self.signal(StreamSignal::Failed);
                }
                None => {
                    self.transport = None;
                    self.signal(StreamSignal::Closed);
                }
            }
        }
    }

    /// Hand out queued notices without waiting on the stream.
    pub fn drain_pending(&mut self) -> Vec<SessionEvent> {
        self.pending.drain(..).collect()
    }

    /// Close the stream from this side.
    pub async fn close(&mut self) -> Result<()> {
        let result = match self.transport.take() {
            Some(mut transport) => transport.close().await,
            None => Ok(()),
        };
        self.signal(StreamSignal::Closed);
        result
    }

    fn signal(&mut self, signal: StreamSignal) {
        let next = self.state.on(signal);
        if next != self.state {
            tracing::debug!(from = %self.state, to = %next, "chat stream transition");
            self.state = next;
            self.pending
                .push_back(SessionEvent::Notice(signal.notice().to_string()));
        }
    }
}
