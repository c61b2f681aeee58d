//! Transport implementations for the lobby socket.
//!
//! This module provides concrete [`Transport`](crate::transport::Transport)
//! implementations behind feature gates. Enable the corresponding Cargo
//! feature to pull in a transport:
//!
//! | Feature                | Transport              |
//! |------------------------|------------------------|
//! | `transport-websocket`  | [`WebSocketTransport`] |

#[cfg(feature = "transport-websocket")]
pub mod websocket;

#[cfg(feature = "transport-websocket")]
pub use websocket::WebSocketTransport;
