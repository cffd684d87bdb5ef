//! An in-process transport.
//!
//! [`MemoryConnector`] hands out [`MemoryTransport`]s whose far end is a
//! [`MemoryPeer`] held by the caller.  This drives a
//! [`ChatSession`](crate::ChatSession) without a network: the peer injects
//! inbound frames, closes or fails the connection, and observes every frame
//! the session sends.
//!
//! ```
//! use ragchat::stream::memory::MemoryConnector;
//! use ragchat::{ChatMode, ChatSession, SessionEvent, SessionPolicy, StreamState};
//! use url::Url;
//!
//! # tokio_test::block_on(async {
//! let connector = MemoryConnector::new();
//! let mut peer = connector.accept();
//! let url = Url::parse("ws://localhost/api/v1/ai/chat?token=abc123").unwrap();
//! let mut session = ChatSession::connect(&connector, url, SessionPolicy::default()).await;
//! assert_eq!(session.state(), StreamState::Open);
//!
//! session.send("hi", ChatMode::Context).await.unwrap();
//! assert_eq!(peer.sent(), vec![r#"{"data":"hi"}"#.to_string()]);
//!
//! peer.push_text(r#"{"timestamp":"12:00","query":"hi","data":"hello!"}"#);
//! session.drain_pending();
//! assert!(matches!(session.next_event().await, Some(SessionEvent::Turn(_))));
//! # });
//! ```

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use url::Url;

use crate::error::{Error, Result};
use crate::stream::transport::{Connector, Transport};

enum PeerFrame {
    Text(String),
    Close,
    Fail(String),
}

/// Create a connected transport/peer pair.
pub fn pair() -> (MemoryTransport, MemoryPeer) {
    let (to_peer, from_session) = mpsc::unbounded_channel();
    let (to_session, from_peer) = mpsc::unbounded_channel();
    (
        MemoryTransport {
            outbound: to_peer,
            inbound: from_peer,
            closed: false,
        },
        MemoryPeer {
            outbound: from_session,
            inbound: to_session,
        },
    )
}

/// The session side of an in-process connection.
pub struct MemoryTransport {
    outbound: UnboundedSender<String>,
    inbound: UnboundedReceiver<PeerFrame>,
    closed: bool,
}

#[async_trait]
impl Transport for MemoryTransport {
    async fn send_text(&mut self, text: String) -> Result<()> {
        if self.closed {
            return Err(Error::streaming("send on closed transport", None));
        }
        self.outbound
            .send(text)
            .map_err(|_| Error::streaming("peer hung up", None))
    }

    async fn next_text(&mut self) -> Option<Result<String>> {
        if self.closed {
            return None;
        }
        match self.inbound.recv().await {
            Some(PeerFrame::Text(text)) => Some(Ok(text)),
            Some(PeerFrame::Fail(message)) => {
                self.closed = true;
                Some(Err(Error::streaming(message, None)))
            }
            Some(PeerFrame::Close) | None => {
                self.closed = true;
                None
            }
        }
    }

    async fn close(&mut self) -> Result<()> {
        self.closed = true;
        self.inbound.close();
        Ok(())
    }
}

/// The far end of an in-process connection.
pub struct MemoryPeer {
    outbound: UnboundedReceiver<String>,
    inbound: UnboundedSender<PeerFrame>,
}

impl MemoryPeer {
    /// Deliver a text frame to the session.
    pub fn push_text<S: Into<String>>(&self, text: S) {
        let _ = self.inbound.send(PeerFrame::Text(text.into()));
    }

    /// End the connection normally.
    pub fn close(&self) {
        let _ = self.inbound.send(PeerFrame::Close);
    }

    /// Fail the connection with a transport error.
    pub fn fail<S: Into<String>>(&self, message: S) {
        let _ = self.inbound.send(PeerFrame::Fail(message.into()));
    }

    /// Every frame the session has transmitted and the peer has not yet read.
    pub fn sent(&mut self) -> Vec<String> {
        let mut frames = Vec::new();
        while let Ok(frame) = self.outbound.try_recv() {
            frames.push(frame);
        }
        frames
    }

    /// True once the session side has closed or been dropped.
    pub fn is_closed(&self) -> bool {
        self.inbound.is_closed()
    }
}

/// [`Connector`] whose handshakes are scripted with [`accept`](Self::accept)
/// and [`refuse`](Self::refuse).
#[derive(Default)]
pub struct MemoryConnector {
    script: Mutex<VecDeque<Option<MemoryTransport>>>,
    attempts: Mutex<Vec<Url>>,
}

impl MemoryConnector {
    /// A connector with nothing scripted; every handshake fails.
    pub fn new() -> Self {
        Self::default()
    }

    /// Let the next handshake succeed, returning the peer for it.
    pub fn accept(&self) -> MemoryPeer {
        let (transport, peer) = pair();
        lock(&self.script).push_back(Some(transport));
        peer
    }

    /// Make the next handshake fail.
    pub fn refuse(&self) {
        lock(&self.script).push_back(None);
    }

    /// Every URL a handshake was attempted with, in order.
    pub fn attempts(&self) -> Vec<Url> {
        lock(&self.attempts).clone()
    }
}

#[async_trait]
impl Connector for MemoryConnector {
    type Transport = MemoryTransport;

    async fn connect(&self, url: &Url) -> Result<MemoryTransport> {
        lock(&self.attempts).push(url.clone());
        match lock(&self.script).pop_front() {
            Some(Some(transport)) => Ok(transport),
            Some(None) => Err(Error::connection("handshake refused", None)),
            None => Err(Error::connection("no peer is listening", None)),
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn frames_flow_both_ways() {
        let (mut transport, mut peer) = pair();
        peer.push_text("inbound");
        assert_eq!(transport.next_text().await.unwrap().unwrap(), "inbound");

        transport.send_text("outbound".to_string()).await.unwrap();
        assert_eq!(peer.sent(), vec!["outbound".to_string()]);
        assert!(peer.sent().is_empty());
    }

    #[tokio::test]
    async fn close_and_fail() {
        let (mut transport, peer) = pair();
        peer.close();
        assert!(transport.next_text().await.is_none());
        assert!(transport.next_text().await.is_none());

        let (mut transport, peer) = pair();
        peer.fail("reset");
        assert!(transport.next_text().await.unwrap().is_err());
        assert!(transport.next_text().await.is_none());
    }

    #[tokio::test]
    async fn local_close_is_visible_to_peer() {
        let (mut transport, peer) = pair();
        assert!(!peer.is_closed());
        transport.close().await.unwrap();
        assert!(peer.is_closed());
        assert!(transport.send_text("late".to_string()).await.is_err());
    }

    #[tokio::test]
    async fn connector_follows_script() {
        let connector = MemoryConnector::new();
        let url = Url::parse("ws://localhost/api/v1/ai/chat?token=t").unwrap();

        let _peer = connector.accept();
        connector.refuse();
        assert!(connector.connect(&url).await.is_ok());
        assert!(connector.connect(&url).await.is_err());
        assert!(connector.connect(&url).await.is_err());
        assert_eq!(connector.attempts().len(), 3);
    }
}
