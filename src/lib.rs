//! # Wallet Lobby Client
//!
//! Wallet connection and identity verification for joining a game lobby.
//!
//! A player arrives with the wallet address they are expected to use, a game
//! id and a username. This crate connects a browser-style wallet, checks that
//! the connected account is the expected one and then asks the lobby server to
//! seat the player, exactly once.
//!
//! ## Features
//!
//! - **Pluggable wallets** — implement [`WalletProvider`] for any EIP-1193
//!   style provider; an injected (MetaMask) and an SDK-created (Coinbase)
//!   backend are supported side by side
//! - **Local signer** — [`backends::LocalWalletProvider`] signs with in-memory
//!   secp256k1 keys using EIP-191 personal messages
//! - **Transport-agnostic** — implement the [`Transport`] trait for the lobby
//!   socket; the default `transport-websocket` feature provides
//!   `WebSocketTransport`
//! - **Event-driven** — [`ConnectFlow`] publishes typed [`FlowEvent`]s on a
//!   channel for the host UI
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use wallet_lobby_client::{
//!     BackendKind, ConnectFlow, FlowConfig, FlowEvent, JoinParams, SessionConfig,
//!     WalletBackends, WalletSession, WebSocketTransport,
//! };
//!
//! let backends = WalletBackends::new().with_injected(injected_provider);
//! let session = Arc::new(WalletSession::new(backends, SessionConfig::default()));
//! let params = JoinParams::from_query("?walletAddress=0x…&gameId=g1&username=bob");
//!
//! let (mut flow, mut events) = ConnectFlow::new(session, params, FlowConfig::default());
//! let socket = WebSocketTransport::connect("ws://localhost:3001/socket").await?;
//! flow.attach_transport(Arc::new(socket)).await;
//! flow.connect_with(BackendKind::MetaMask).await?;
//!
//! while let Some(event) = events.recv().await {
//!     if let FlowEvent::Navigate { route } = event {
//!         println!("go to {route}");
//!         break;
//!     }
//! }
//! ```

pub mod address;
pub mod backend;
pub mod backends;
pub mod eip191;
pub mod error;
pub mod flow;
pub mod params;
pub mod protocol;
pub mod session;
pub mod transport;
pub mod transports;

// Re-export primary types for ergonomic imports.
pub use address::{addresses_match, short_address, VerificationResult};
pub use backend::{BackendKind, SdkConfig, Signer, WalletBackends, WalletProvider};
pub use error::{BackendError, SessionError, SessionErrorKind, TransportError};
pub use flow::{ConnectFlow, FlowConfig, FlowEvent, FlowState, Notice};
pub use params::JoinParams;
pub use protocol::{ClientEvent, LobbyJoinRequest};
pub use session::{SessionConfig, SessionEvent, WalletConnection, WalletSession};
pub use transport::Transport;

#[cfg(feature = "transport-websocket")]
pub use transports::WebSocketTransport;
