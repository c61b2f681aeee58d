//! WebSocket transport implementation using `tokio-tungstenite`.
//!
//! This module provides [`WebSocketTransport`], a [`Transport`]
//! implementation that writes `[event, payload]` text frames over a WebSocket
//! connection. Both `ws://` and `wss://` URLs are supported — TLS is handled
//! transparently via [`MaybeTlsStream`](tokio_tungstenite::MaybeTlsStream).
//!
//! The write and read halves are split and locked independently, so one task
//! can sit in [`recv`](WebSocketTransport::recv) while the connect flow emits
//! through the shared handle.
//!
//! # Feature gate
//!
//! This module is only available when the `transport-websocket` feature is enabled
//! (it is enabled by default).
//!
//! # Example
//!
//! ```rust,no_run
//! # async fn example() -> Result<(), wallet_lobby_client::error::TransportError> {
//! use wallet_lobby_client::WebSocketTransport;
//! use wallet_lobby_client::transport::Transport;
//!
//! let transport = WebSocketTransport::connect("ws://localhost:3000/socket").await?;
//! assert!(transport.is_connected());
//!
//! if let Some(Ok(msg)) = transport.recv().await {
//!     println!("server said: {msg}");
//! }
//!
//! transport.close().await?;
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::Mutex;
use tokio_tungstenite::tungstenite::protocol::Message;

use crate::error::TransportError;
use crate::protocol::ClientEvent;
use crate::transport::Transport;

/// Type alias for the underlying WebSocket stream.
///
/// Made public so that callers can construct a [`WebSocketTransport`] from an
/// existing stream via [`WebSocketTransport::from_stream`].
pub type WsStream =
    tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>;

/// A [`Transport`] implementation backed by a WebSocket connection.
///
/// The socket id is a client-generated UUID v4 unless replaced with
/// [`with_socket_id`](Self::with_socket_id) (e.g. after a server handshake
/// assigned one).
///
/// # Cancel Safety
///
/// [`recv`](Self::recv) is cancel-safe: dropping its future before it
/// completes does not lose any messages.
pub struct WebSocketTransport {
    sink: Mutex<SplitSink<WsStream, Message>>,
    source: Mutex<SplitStream<WsStream>>,
    socket_id: String,
    connected: AtomicBool,
}

impl WebSocketTransport {
    /// Establish a new WebSocket connection to the given URL.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Io`] if the URL is invalid or the connection
    /// cannot be established. When the underlying error is an I/O error its
    /// [`ErrorKind`](std::io::ErrorKind) is preserved; all other errors are
    /// mapped to [`ErrorKind::Other`](std::io::ErrorKind::Other).
    pub async fn connect(url: &str) -> Result<Self, TransportError> {
        tracing::debug!(url = %url, "connecting to lobby socket");

        let (stream, _response) = tokio_tungstenite::connect_async(url).await.map_err(|e| {
            let kind = match &e {
                tokio_tungstenite::tungstenite::Error::Io(io) => io.kind(),
                _ => std::io::ErrorKind::Other,
            };
            TransportError::Io(std::io::Error::new(kind, e))
        })?;

        let transport = Self::from_stream(stream);
        tracing::info!(url = %url, socket_id = %transport.socket_id, "lobby socket connected");
        Ok(transport)
    }

    /// Establish a new WebSocket connection with a timeout.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Timeout`] if the deadline elapses, or any
    /// error that [`connect`](Self::connect) may return.
    pub async fn connect_with_timeout(
        url: &str,
        timeout: std::time::Duration,
    ) -> Result<Self, TransportError> {
        tokio::time::timeout(timeout, Self::connect(url))
            .await
            .map_err(|_| TransportError::Timeout)?
    }

    /// Wrap an already-established WebSocket stream.
    ///
    /// Useful when you need custom TLS configuration, proxy headers, or any
    /// other connection setup that [`connect`](Self::connect) does not expose.
    pub fn from_stream(stream: WsStream) -> Self {
        let (sink, source) = stream.split();
        Self {
            sink: Mutex::new(sink),
            source: Mutex::new(source),
            socket_id: uuid::Uuid::new_v4().to_string(),
            connected: AtomicBool::new(true),
        }
    }

    /// Replace the socket id reported to the connect flow.
    #[must_use]
    pub fn with_socket_id(mut self, socket_id: impl Into<String>) -> Self {
        self.socket_id = socket_id.into();
        self
    }

    /// Receive the next text frame from the server.
    ///
    /// Returns:
    /// - `Some(Ok(text))` — a text frame was received
    /// - `Some(Err(e))` — a transport error occurred
    /// - `None` — the connection was closed
    pub async fn recv(&self) -> Option<Result<String, TransportError>> {
        let mut source = self.source.lock().await;
        loop {
            let msg = match source.next().await {
                Some(Ok(msg)) => msg,
                Some(Err(e)) => {
                    self.connected.store(false, Ordering::Release);
                    return Some(Err(TransportError::Receive(e.to_string())));
                }
                None => {
                    self.connected.store(false, Ordering::Release);
                    return None;
                }
            };

            match msg {
                Message::Text(text) => return Some(Ok(text.to_string())),
                Message::Close(frame) => {
                    tracing::debug!(?frame, "received WebSocket close frame");
                    self.connected.store(false, Ordering::Release);
                    return None;
                }
                Message::Ping(_) | Message::Pong(_) => {
                    // tungstenite queues the pong reply itself.
                }
                Message::Binary(_) => {
                    tracing::warn!("received unexpected binary WebSocket frame, skipping");
                }
                Message::Frame(_) => {
                    tracing::debug!("received raw WebSocket frame, skipping");
                }
            }
        }
    }

    /// Close the connection. Closing twice is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Send`] if the close handshake cannot be written.
    pub async fn close(&self) -> Result<(), TransportError> {
        if !self.connected.swap(false, Ordering::AcqRel) {
            return Ok(());
        }
        self.sink
            .lock()
            .await
            .close()
            .await
            .map_err(|e| TransportError::Send(e.to_string()))
    }
}

impl fmt::Debug for WebSocketTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebSocketTransport")
            .field("socket_id", &self.socket_id)
            .field("connected", &self.is_connected())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Transport for WebSocketTransport {
    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    fn socket_id(&self) -> Option<String> {
        Some(self.socket_id.clone())
    }

    async fn emit(&self, event: ClientEvent) -> Result<(), TransportError> {
        if !self.is_connected() {
            return Err(TransportError::Closed);
        }
        let frame = event.to_frame()?;
        tracing::debug!(event = event.name(), "emitting lobby event");
        self.sink
            .lock()
            .await
            .send(Message::Text(frame.into()))
            .await
            .map_err(|e| TransportError::Send(e.to_string()))
    }
}

#[cfg(test)]
#[cfg(feature = "transport-websocket")]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::indexing_slicing
)]
mod tests {
    use super::*;
    use crate::protocol::LobbyJoinRequest;

    #[test]
    fn websocket_transport_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<WebSocketTransport>();
    }

    #[tokio::test]
    async fn connect_fails_with_invalid_url() {
        let result = WebSocketTransport::connect("not-a-valid-url").await;
        let err = result.unwrap_err();
        assert!(matches!(err, TransportError::Io(_)));
    }

    #[tokio::test]
    async fn connect_fails_with_unreachable_host() {
        let result = WebSocketTransport::connect("ws://127.0.0.1:1").await;
        let err = result.unwrap_err();
        assert!(matches!(err, TransportError::Io(_)));
    }

    // ── Mock-stream helpers ──────────────────────────────────────────────

    use tokio::net::TcpListener;

    /// Start a local WebSocket server that runs `handler` on the accepted
    /// connection and returns the address to connect to.
    async fn start_mock_server<F, Fut>(handler: F) -> String
    where
        F: FnOnce(tokio_tungstenite::WebSocketStream<tokio::net::TcpStream>) -> Fut
            + Send
            + 'static,
        Fut: std::future::Future<Output = ()> + Send,
    {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (tcp, _) = listener.accept().await.unwrap();
            let ws = tokio_tungstenite::accept_async(tcp).await.unwrap();
            handler(ws).await;
        });

        format!("ws://{addr}")
    }

    fn join_event() -> ClientEvent {
        ClientEvent::FetchLobbyInfo(LobbyJoinRequest {
            wallet_address: "0xAAA0000000000000000000000000000000000001".into(),
            socket_id: "sock-1".into(),
            game_id: "g1".into(),
            username: "bob".into(),
        })
    }

    // ── Mock-stream tests ────────────────────────────────────────────────

    #[tokio::test]
    async fn recv_receives_text_messages() {
        let url = start_mock_server(|mut ws| async move {
            ws.send(Message::Text("hello".into())).await.unwrap();
            ws.send(Message::Text("world".into())).await.unwrap();
            ws.close(None).await.unwrap();
        })
        .await;

        let transport = WebSocketTransport::connect(&url).await.unwrap();
        assert_eq!(transport.recv().await.unwrap().unwrap(), "hello");
        assert_eq!(transport.recv().await.unwrap().unwrap(), "world");
    }

    #[tokio::test]
    async fn close_frame_marks_transport_disconnected() {
        let url = start_mock_server(|mut ws| async move {
            ws.close(None).await.unwrap();
        })
        .await;

        let transport = WebSocketTransport::connect(&url).await.unwrap();
        assert!(transport.is_connected());
        assert!(transport.recv().await.is_none());
        assert!(!transport.is_connected());
    }

    #[tokio::test]
    async fn recv_skips_binary_frames() {
        let url = start_mock_server(|mut ws| async move {
            ws.send(Message::Binary(vec![0xDE, 0xAD].into()))
                .await
                .unwrap();
            ws.send(Message::Text("after_binary".into())).await.unwrap();
            ws.close(None).await.unwrap();
        })
        .await;

        let transport = WebSocketTransport::connect(&url).await.unwrap();
        assert_eq!(transport.recv().await.unwrap().unwrap(), "after_binary");
    }

    #[tokio::test]
    async fn emit_writes_join_frame() {
        let url = start_mock_server(|mut ws| async move {
            // Echo the first frame back so the client can inspect it.
            if let Some(Ok(Message::Text(text))) = ws.next().await {
                ws.send(Message::Text(text)).await.unwrap();
            }
            ws.close(None).await.unwrap();
        })
        .await;

        let transport = WebSocketTransport::connect(&url).await.unwrap();
        transport.emit(join_event()).await.unwrap();

        let echoed = transport.recv().await.unwrap().unwrap();
        assert_eq!(ClientEvent::from_frame(&echoed).unwrap(), join_event());
    }

    #[tokio::test]
    async fn emit_after_close_returns_closed() {
        let url = start_mock_server(|mut ws| async move {
            while let Some(Ok(_)) = ws.next().await {}
        })
        .await;

        let transport = WebSocketTransport::connect(&url).await.unwrap();
        transport.close().await.unwrap();

        let err = transport.emit(join_event()).await.unwrap_err();
        assert!(matches!(err, TransportError::Closed));
    }

    #[tokio::test]
    async fn double_close_is_idempotent() {
        let url =
            start_mock_server(|mut ws| async move { while let Some(Ok(_)) = ws.next().await {} })
                .await;

        let transport = WebSocketTransport::connect(&url).await.unwrap();
        transport.close().await.unwrap();
        transport.close().await.unwrap();
    }

    #[tokio::test]
    async fn connect_with_timeout_times_out() {
        // Use a non-routable address to guarantee a timeout.
        let result = WebSocketTransport::connect_with_timeout(
            "ws://192.0.2.1:1",
            std::time::Duration::from_millis(50),
        )
        .await;

        let err = result.unwrap_err();
        assert!(matches!(err, TransportError::Timeout));
    }

    #[tokio::test]
    async fn from_stream_assigns_socket_id() {
        let url = start_mock_server(|mut ws| async move {
            ws.send(Message::Text("from_stream_msg".into()))
                .await
                .unwrap();
            ws.close(None).await.unwrap();
        })
        .await;

        let (ws_stream, _) = tokio_tungstenite::connect_async(&url).await.unwrap();
        let transport = WebSocketTransport::from_stream(ws_stream).with_socket_id("sid-42");

        assert_eq!(transport.socket_id().as_deref(), Some("sid-42"));
        assert_eq!(transport.recv().await.unwrap().unwrap(), "from_stream_msg");
    }

    #[tokio::test]
    async fn generated_socket_ids_are_unique() {
        type ServerStream = tokio_tungstenite::WebSocketStream<tokio::net::TcpStream>;
        let handler = |mut ws: ServerStream| async move {
            while let Some(Ok(_)) = ws.next().await {}
        };
        let a = WebSocketTransport::connect(&start_mock_server(handler).await)
            .await
            .unwrap();
        let b = WebSocketTransport::connect(&start_mock_server(handler).await)
            .await
            .unwrap();
        assert_ne!(a.socket_id(), b.socket_id());
    }
}
