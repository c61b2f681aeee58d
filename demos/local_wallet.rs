//! # Local Wallet Example
//!
//! Runs the whole connect-and-join flow in-process:
//!
//! - a [`LocalWalletProvider`] with two accounts plays the browser wallet
//! - a channel-based loopback implements [`Transport`] and plays the lobby
//!
//! The expected address is the wallet's *second* account, so the first
//! connect is rejected as a mismatch. Switching accounts in the wallet and
//! connecting again verifies the player and joins the lobby.
//!
//! ## Running
//!
//! ```sh
//! cargo run --example local_wallet
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;
use wallet_lobby_client::backends::LocalWalletProvider;
use wallet_lobby_client::protocol::ClientEvent;
use wallet_lobby_client::{
    BackendKind, ConnectFlow, FlowConfig, FlowEvent, JoinParams, SessionConfig, Transport,
    TransportError, WalletBackends, WalletSession,
};

// ─────────────────────────────────────────────────────────────────────
// Step 1: A loopback transport
// ─────────────────────────────────────────────────────────────────────

/// Hands every emitted frame to an in-process "server" channel.
pub struct LoopbackTransport {
    tx: mpsc::UnboundedSender<String>,
    connected: AtomicBool,
}

#[async_trait]
impl Transport for LoopbackTransport {
    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    fn socket_id(&self) -> Option<String> {
        Some("loopback-1".into())
    }

    /// Encode the event exactly as it would go over the wire.
    async fn emit(&self, event: ClientEvent) -> Result<(), TransportError> {
        let frame = event.to_frame()?;
        self.tx
            .send(frame)
            .map_err(|e| TransportError::Send(e.to_string()))
    }
}

// ─────────────────────────────────────────────────────────────────────
// Step 2: Wire the wallet, the flow and the fake lobby together
// ─────────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let provider = Arc::new(LocalWalletProvider::random(2));
    let accounts = provider.accounts().await;
    let Some(expected) = accounts.get(1).cloned() else {
        return Err("local wallet has fewer than two accounts".into());
    };

    let session = Arc::new(WalletSession::new(
        WalletBackends::new().with_injected(provider.clone()),
        SessionConfig::default(),
    ));
    let query = format!("?walletAddress={expected}&gameId=demo-table&username=alice");
    let (mut flow, mut event_rx) =
        ConnectFlow::new(session, JoinParams::from_query(&query), FlowConfig::default());

    let (tx, mut lobby_rx) = mpsc::unbounded_channel();
    let transport = Arc::new(LoopbackTransport {
        tx,
        connected: AtomicBool::new(true),
    });
    flow.attach_transport(transport).await;

    // ── First attempt: wrong account is active ──────────────────────
    let state = flow.connect_with(BackendKind::MetaMask).await?;
    tracing::info!("After first connect: {state:?}");

    // ── Switch accounts in the wallet and try again ─────────────────
    provider.switch_account(&expected).await?;
    let state = flow.connect_with(BackendKind::MetaMask).await?;
    tracing::info!("After second connect: {state:?}");

    // ── What the host would show ────────────────────────────────────
    while let Ok(event) = event_rx.try_recv() {
        match event {
            FlowEvent::Notice(notice) => {
                tracing::info!("[{}] {}", notice.title(), notice.text());
            }
            FlowEvent::Navigate { route } => tracing::info!("Navigate to {route}"),
            other => tracing::debug!("Event: {other:?}"),
        }
    }

    // ── What the lobby received ─────────────────────────────────────
    while let Ok(frame) = lobby_rx.try_recv() {
        tracing::info!("Lobby received: {frame}");
    }

    flow.session().disconnect().await;
    Ok(())
}
