//! End-to-end test: the connect flow joining a lobby over a real WebSocket.
//!
//! A local tokio-tungstenite server stands in for the lobby and reports the
//! first text frame it receives.

#![cfg(feature = "transport-websocket")]

mod common;

use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio_tungstenite::tungstenite::Message;
use wallet_lobby_client::protocol::ClientEvent;
use wallet_lobby_client::{
    BackendKind, ConnectFlow, FlowConfig, FlowState, JoinParams, WebSocketTransport,
};

use common::{injected_session, local_wallet};

/// Bind a one-shot lobby server. Returns its URL and a receiver for the
/// first text frame.
async fn start_lobby_server() -> (String, oneshot::Receiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    let (frame_tx, frame_rx) = oneshot::channel();

    tokio::spawn(async move {
        let (tcp, _) = listener.accept().await.expect("accept");
        let mut ws = tokio_tungstenite::accept_async(tcp).await.expect("handshake");
        while let Some(Ok(message)) = ws.next().await {
            if let Message::Text(text) = message {
                let _ = frame_tx.send(text.as_str().to_owned());
                break;
            }
        }
    });

    (format!("ws://{addr}"), frame_rx)
}

#[tokio::test]
async fn flow_joins_lobby_over_websocket() {
    let (url, frame_rx) = start_lobby_server().await;
    let (provider, address) = local_wallet(1).await;

    let transport = WebSocketTransport::connect(&url)
        .await
        .expect("connect")
        .with_socket_id("sock-ws");
    let params = JoinParams::new(address.clone(), "g7", "carol");
    let (mut flow, _events) =
        ConnectFlow::new(injected_session(&provider), params, FlowConfig::default());

    flow.attach_transport(Arc::new(transport)).await;
    let state = flow.connect_with(BackendKind::MetaMask).await.expect("connect");
    assert_eq!(state, FlowState::Verified);

    let frame = tokio::time::timeout(Duration::from_secs(2), frame_rx)
        .await
        .expect("frame within timeout")
        .expect("server saw a frame");
    let ClientEvent::FetchLobbyInfo(request) = ClientEvent::from_frame(&frame).expect("decode");
    assert_eq!(request.wallet_address, address);
    assert_eq!(request.socket_id, "sock-ws");
    assert_eq!(request.game_id, "g7");
    assert_eq!(request.username, "carol");
}

#[tokio::test]
async fn closed_socket_keeps_flow_waiting() {
    let (url, _frame_rx) = start_lobby_server().await;
    let (provider, address) = local_wallet(1).await;

    let transport = Arc::new(WebSocketTransport::connect(&url).await.expect("connect"));
    transport.close().await.expect("close");

    let params = JoinParams::new(address, "g7", "carol");
    let (mut flow, _events) =
        ConnectFlow::new(injected_session(&provider), params, FlowConfig::default());
    flow.attach_transport(transport).await;

    let state = flow.connect_with(BackendKind::MetaMask).await.expect("connect");
    assert_eq!(state, FlowState::AwaitingTransport);
    assert!(!flow.has_joined());
}
