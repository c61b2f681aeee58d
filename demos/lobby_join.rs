//! # Lobby Join Example
//!
//! Demonstrates the complete connect-and-join lifecycle:
//!
//! 1. Read the expected identity from a query string
//! 2. Connect to the lobby server via WebSocket
//! 3. Connect a wallet and sign the confirmation message
//! 4. Join the lobby once the wallet is verified
//! 5. Shut down on navigation, Ctrl+C or socket close
//!
//! The wallet is a local in-memory key. Set `WALLET_PRIVATE_KEY` to a hex
//! secp256k1 key to use a fixed identity; otherwise a random one is created.
//!
//! ## Running
//!
//! ```sh
//! # Start a lobby server on localhost:3001, then:
//! cargo run --example lobby_join
//!
//! # Override the server URL and the query string:
//! LOBBY_URL=ws://my-server:3001/socket \
//! LOBBY_QUERY='?walletAddress=0x…&gameId=g1&username=alice' \
//! cargo run --example lobby_join
//! ```

use std::sync::Arc;

use wallet_lobby_client::backends::{LocalKeySigner, LocalWalletProvider};
use wallet_lobby_client::{
    BackendKind, ConnectFlow, FlowConfig, FlowEvent, FlowState, JoinParams, SessionConfig,
    WalletBackends, WalletSession, WebSocketTransport,
};

/// Default server URL when `LOBBY_URL` is not set.
const DEFAULT_URL: &str = "ws://localhost:3001/socket";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // ── Logging ─────────────────────────────────────────────────────
    // Initialize tracing. Set `RUST_LOG=debug` for verbose output.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    // ── Wallet ──────────────────────────────────────────────────────
    let signer = match std::env::var("WALLET_PRIVATE_KEY") {
        Ok(key) => LocalKeySigner::from_hex(&key)?,
        Err(_) => LocalKeySigner::random(),
    };
    let provider = Arc::new(LocalWalletProvider::new(vec![signer]));
    let address = provider.accounts().await.remove(0);
    tracing::info!("Local wallet address: {address}");

    let backends = WalletBackends::new().with_injected(provider);
    let session = Arc::new(WalletSession::new(backends, SessionConfig::default()));

    // ── Configuration ───────────────────────────────────────────────
    let url = std::env::var("LOBBY_URL").unwrap_or_else(|_| DEFAULT_URL.to_string());
    let query = std::env::var("LOBBY_QUERY").unwrap_or_else(|_| {
        format!("?walletAddress={address}&gameId=example-game&username=RustPlayer")
    });
    let params = JoinParams::from_query(&query);
    tracing::info!("Join parameters: {params:?}");

    // ── Connect ─────────────────────────────────────────────────────
    tracing::info!("Connecting to {url}");
    let transport = Arc::new(WebSocketTransport::connect(&url).await?);

    let (mut flow, mut event_rx) = ConnectFlow::new(session, params, FlowConfig::default());
    flow.attach_transport(transport.clone()).await;

    if let Err(e) = flow.connect_with(BackendKind::MetaMask).await {
        tracing::error!("Wallet connect failed: {e}");
    }
    if flow.state() == FlowState::ManualConnect {
        tracing::warn!("Query is missing walletAddress, gameId or username; not joining");
    }

    // ── Event loop ──────────────────────────────────────────────────
    loop {
        tokio::select! {
            event = event_rx.recv() => {
                let Some(event) = event else {
                    break;
                };
                match event {
                    FlowEvent::Notice(notice) if notice.is_error() => {
                        tracing::error!("{}: {}", notice.title(), notice.text());
                    }
                    FlowEvent::Notice(notice) => {
                        tracing::info!("{}: {}", notice.title(), notice.text());
                    }
                    FlowEvent::LobbyJoined(request) => {
                        tracing::info!(
                            "Joined lobby of game {} as {} (socket {})",
                            request.game_id,
                            request.username,
                            request.socket_id
                        );
                    }
                    FlowEvent::Navigate { route } => {
                        tracing::info!("Navigate to {route}");
                        break;
                    }
                    FlowEvent::ChainChanged { chain_id } => {
                        tracing::warn!("Wallet switched to chain {chain_id}, connect again");
                    }
                    other => tracing::debug!("Event: {other:?}"),
                }
            }

            // Wallet-side changes (account switch, revoked access).
            state = flow.next_session_event() => {
                if state.is_none() {
                    break;
                }
            }

            // Inbound lobby traffic; the socket closing ends the example.
            frame = transport.recv() => {
                match frame {
                    Some(Ok(text)) => tracing::info!("Server: {text}"),
                    Some(Err(e)) => tracing::warn!("Socket error: {e}"),
                    None => {
                        tracing::warn!("Socket closed");
                        break;
                    }
                }
            }

            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Ctrl+C received, shutting down…");
                break;
            }
        }
    }

    // ── Cleanup ─────────────────────────────────────────────────────
    transport.close().await?;
    flow.session().disconnect().await;
    tracing::info!("Goodbye!");
    Ok(())
}
