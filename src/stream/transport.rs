//! Transports carrying chat frames.
//!
//! A [`Connector`] performs the handshake and yields a [`Transport`], which
//! moves text frames in both directions.  [`WebSocketConnector`] is the real
//! implementation.

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::error::{Error as WsError, ProtocolError};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use url::Url;

use crate::error::{Error, Result};

/// An established, bidirectional text-frame connection.
#[async_trait]
pub trait Transport: Send {
    /// Transmit one text frame.
    async fn send_text(&mut self, text: String) -> Result<()>;

    /// Wait for the next inbound text frame.
    ///
    /// Returns `None` once the connection has ended, normally or not.
    /// `Some(Err(_))` reports a transport failure.
    async fn next_text(&mut self) -> Option<Result<String>>;

    /// Close the connection from this side.
    async fn close(&mut self) -> Result<()>;
}

/// Opens [`Transport`]s.
#[async_trait]
pub trait Connector: Send + Sync {
    /// The transport this connector produces.
    type Transport: Transport + 'static;

    /// Perform the handshake with `url`.
    async fn connect(&self, url: &Url) -> Result<Self::Transport>;
}

/// [`Connector`] for `ws://` and `wss://` URLs.
#[derive(Debug, Clone, Copy, Default)]
pub struct WebSocketConnector;

#[async_trait]
impl Connector for WebSocketConnector {
    type Transport = WebSocketTransport;

    async fn connect(&self, url: &Url) -> Result<WebSocketTransport> {
        let (inner, response) = connect_async(url.as_str()).await.map_err(|e| {
            Error::connection(format!("WebSocket handshake failed: {e}"), Some(Box::new(e)))
        })?;
        tracing::debug!(status = response.status().as_u16(), "websocket handshake complete");
        Ok(WebSocketTransport { inner })
    }
}

/// A WebSocket connection carrying chat frames.
///
/// Binary frames are ignored; ping/pong is answered by tungstenite.
pub struct WebSocketTransport {
    inner: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

#[async_trait]
impl Transport for WebSocketTransport {
    async fn send_text(&mut self, text: String) -> Result<()> {
        self.inner
            .send(Message::Text(text))
            .await
            .map_err(|e| Error::streaming(format!("send failed: {e}"), Some(Box::new(e))))
    }

    async fn next_text(&mut self) -> Option<Result<String>> {
        loop {
            match self.inner.next().await? {
                Ok(Message::Text(text)) => return Some(Ok(text)),
                Ok(Message::Close(frame)) => {
                    tracing::debug!(?frame, "server closed the stream");
                    return None;
                }
                Ok(_) => continue,
                Err(WsError::ConnectionClosed | WsError::AlreadyClosed) => return None,
                Err(WsError::Protocol(ProtocolError::ResetWithoutClosingHandshake)) => {
                    tracing::debug!("stream reset without closing handshake");
                    return None;
                }
                Err(e) => {
                    return Some(Err(Error::streaming(
                        format!("receive failed: {e}"),
                        Some(Box::new(e)),
                    )));
                }
            }
        }
    }

    async fn close(&mut self) -> Result<()> {
        match self.inner.close(None).await {
            Ok(()) | Err(WsError::ConnectionClosed | WsError::AlreadyClosed) => Ok(()),
            Err(e) => Err(Error::streaming(
                format!("close failed: {e}"),
                Some(Box::new(e)),
            )),
        }
    }
}
