//! Transport abstraction for the lobby socket.
//!
//! The connect flow needs three things from the socket it shares with the
//! rest of the game client: whether it is connected, the id the server knows
//! it by, and a way to emit one [`ClientEvent`]. Everything else about the
//! socket (reconnection, inbound game traffic) stays with its owner.
//!
//! # Connection Setup
//!
//! Connection setup is intentionally NOT part of this trait. Construct a
//! connected transport externally, wrap it in an `Arc` and hand it to
//! `ConnectFlow::attach_transport`.
//!
//! # Implementing a Custom Transport
//!
//! ```rust,no_run
//! use async_trait::async_trait;
//! use wallet_lobby_client::error::TransportError;
//! use wallet_lobby_client::protocol::ClientEvent;
//! use wallet_lobby_client::transport::Transport;
//!
//! struct MySocket { /* ... */ }
//!
//! #[async_trait]
//! impl Transport for MySocket {
//!     fn is_connected(&self) -> bool {
//!         true
//!     }
//!
//!     fn socket_id(&self) -> Option<String> {
//!         Some("socket-1".into())
//!     }
//!
//!     async fn emit(&self, event: ClientEvent) -> Result<(), TransportError> {
//!         let _frame = event.to_frame()?;
//!         // Write the frame to your socket
//!         Ok(())
//!     }
//! }
//! ```

use async_trait::async_trait;

use crate::error::TransportError;
use crate::protocol::ClientEvent;

/// A shared handle to the lobby socket.
///
/// Methods take `&self`: the handle is shared between the connect flow and
/// the rest of the client, so implementations synchronize internally.
///
/// # Object Safety
///
/// This trait is object-safe; the connect flow stores it as
/// `Arc<dyn Transport>`.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    /// Returns `true` while the socket is connected to the server.
    fn is_connected(&self) -> bool;

    /// Id of the socket session, once assigned.
    fn socket_id(&self) -> Option<String>;

    /// Emit one event to the server.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Closed`] if the socket is closed, or
    /// [`TransportError::Send`] if the frame could not be written.
    async fn emit(&self, event: ClientEvent) -> Result<(), TransportError>;
}
