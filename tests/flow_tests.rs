//! Integration tests for the connect-and-join flow.
//!
//! Drives [`ConnectFlow`] against a recording `MockTransport` and local
//! wallets from `tests/common`, checking state transitions, the lobby-join
//! payload and the events published to the host.

mod common;

use std::sync::Arc;

use wallet_lobby_client::protocol::{ClientEvent, CS_FETCH_LOBBY_INFO};
use wallet_lobby_client::{
    BackendKind, ConnectFlow, FlowConfig, FlowEvent, FlowState, JoinParams, LobbyJoinRequest,
    Notice, SessionErrorKind, WalletSession,
};

use common::{
    drain_events, injected_session, local_wallet, sdk_session, MockTransport, MOCK_SOCKET_ID,
};

const OTHER_ADDRESS: &str = "0xBBB0000000000000000000000000000000000002";

// ════════════════════════════════════════════════════════════════════
// Helpers
// ════════════════════════════════════════════════════════════════════

fn start_flow(
    session: Arc<WalletSession>,
    query: &str,
) -> (ConnectFlow, tokio::sync::mpsc::Receiver<FlowEvent>) {
    ConnectFlow::new(session, JoinParams::from_query(query), FlowConfig::default())
}

fn join_query(address: &str) -> String {
    format!("?walletAddress={address}&gameId=g1&username=bob")
}

fn join_requests(transport: &MockTransport) -> Vec<LobbyJoinRequest> {
    transport
        .emitted()
        .into_iter()
        .map(|event| match event {
            ClientEvent::FetchLobbyInfo(request) => request,
        })
        .collect()
}

// ════════════════════════════════════════════════════════════════════
// Verified join
// ════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn verified_wallet_joins_lobby_then_navigates() {
    let (provider, address) = local_wallet(1).await;
    let (mut flow, mut events) = start_flow(injected_session(&provider), &join_query(&address));
    let transport = MockTransport::connected();

    assert_eq!(flow.attach_transport(transport.clone()).await, FlowState::AwaitingWalletAction);
    let state = flow.connect_with(BackendKind::MetaMask).await.expect("connect");
    assert_eq!(state, FlowState::Verified);

    let requests = join_requests(&transport);
    assert_eq!(
        requests,
        vec![LobbyJoinRequest {
            wallet_address: address.clone(),
            socket_id: MOCK_SOCKET_ID.into(),
            game_id: "g1".into(),
            username: "bob".into(),
        }]
    );

    let events = drain_events(&mut events);
    let joined = events
        .iter()
        .position(|e| matches!(e, FlowEvent::LobbyJoined(_)))
        .expect("LobbyJoined event");
    let navigate = events
        .iter()
        .position(|e| matches!(e, FlowEvent::Navigate { .. }))
        .expect("Navigate event");
    assert!(joined < navigate, "join must precede navigation: {events:?}");
    assert!(events.contains(&FlowEvent::Navigate {
        route: "/play".into()
    }));
    assert!(events.contains(&FlowEvent::WalletAddress(address.clone())));
    assert!(events.contains(&FlowEvent::Notice(Notice::Connected { address })));
}

#[tokio::test]
async fn join_frame_matches_wire_format() {
    let (provider, address) = local_wallet(1).await;
    let (mut flow, _events) = start_flow(injected_session(&provider), &join_query(&address));
    let transport = MockTransport::connected();
    flow.attach_transport(transport.clone()).await;
    flow.connect_with(BackendKind::MetaMask).await.expect("connect");

    let frame = transport.emitted()[0].to_frame().expect("frame");
    let value: serde_json::Value = serde_json::from_str(&frame).expect("json");
    assert_eq!(
        value,
        serde_json::json!([
            CS_FETCH_LOBBY_INFO,
            {
                "walletAddress": address,
                "socketId": MOCK_SOCKET_ID,
                "gameId": "g1",
                "username": "bob",
            }
        ])
    );
}

#[tokio::test]
async fn reevaluation_never_rejoins() {
    let (provider, address) = local_wallet(1).await;
    let (mut flow, mut events) = start_flow(injected_session(&provider), &join_query(&address));
    let transport = MockTransport::connected();
    flow.attach_transport(transport.clone()).await;
    flow.connect_with(BackendKind::MetaMask).await.expect("connect");

    for _ in 0..5 {
        assert_eq!(flow.evaluate().await, FlowState::Verified);
    }
    flow.attach_transport(transport.clone()).await;
    flow.connect_with(BackendKind::MetaMask).await.expect("ignored");

    assert_eq!(transport.emitted().len(), 1);
    let navigations = drain_events(&mut events)
        .into_iter()
        .filter(|e| matches!(e, FlowEvent::Navigate { .. }))
        .count();
    assert_eq!(navigations, 1);
}

#[tokio::test]
async fn expected_address_matches_case_insensitively() {
    let (provider, address) = local_wallet(1).await;
    let query = join_query(&address.to_ascii_lowercase());
    let (mut flow, _events) = start_flow(injected_session(&provider), &query);
    let transport = MockTransport::connected();
    flow.attach_transport(transport.clone()).await;

    assert_eq!(
        flow.connect_with(BackendKind::MetaMask).await.expect("connect"),
        FlowState::Verified
    );
    // The payload carries the wallet's own spelling of the address.
    assert_eq!(join_requests(&transport)[0].wallet_address, address);
}

#[tokio::test]
async fn coinbase_backend_joins_lobby() {
    let (provider, address) = local_wallet(1).await;
    let (session, factory) = sdk_session(&provider);
    let (mut flow, _events) = start_flow(session, &join_query(&address));
    let transport = MockTransport::connected();
    flow.attach_transport(transport.clone()).await;

    let state = flow.connect_with(BackendKind::Coinbase).await.expect("connect");
    assert_eq!(state, FlowState::Verified);
    assert_eq!(transport.emitted().len(), 1);
    assert_eq!(factory.requested_configs()[0].app_name, "Poker Game");
}

// ════════════════════════════════════════════════════════════════════
// Mismatch
// ════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn mismatched_wallet_is_never_joined() {
    let (provider, address) = local_wallet(1).await;
    let (mut flow, mut events) =
        start_flow(injected_session(&provider), &join_query(OTHER_ADDRESS));
    let transport = MockTransport::connected();
    flow.attach_transport(transport.clone()).await;

    let state = flow.connect_with(BackendKind::MetaMask).await.expect("connect");
    assert_eq!(state, FlowState::Mismatched);
    assert!(transport.emitted().is_empty());

    let verification = flow.verification().expect("verification");
    assert_eq!(verification.expected_address(), OTHER_ADDRESS);
    assert_eq!(verification.actual_address(), address);
    assert!(!verification.matches());

    let events = drain_events(&mut events);
    let mismatch = events
        .iter()
        .find_map(|e| match e {
            FlowEvent::Notice(notice @ Notice::AddressMismatch { .. }) => Some(notice.clone()),
            _ => None,
        })
        .expect("mismatch notice");
    assert_eq!(mismatch.title(), "Wallet Mismatch");
    assert_eq!(
        mismatch.text(),
        "The connected wallet does not match the expected wallet address."
    );
    assert!(!events
        .iter()
        .any(|e| matches!(e, FlowEvent::Navigate { .. } | FlowEvent::LobbyJoined(_))));

    for _ in 0..3 {
        assert_eq!(flow.evaluate().await, FlowState::Mismatched);
    }
    assert!(transport.emitted().is_empty());
}

#[tokio::test]
async fn switching_to_expected_account_after_mismatch_joins() {
    let (provider, _) = local_wallet(2).await;
    let expected = provider.accounts().await[1].clone();
    let (mut flow, _events) = start_flow(injected_session(&provider), &join_query(&expected));
    let transport = MockTransport::connected();
    flow.attach_transport(transport.clone()).await;

    assert_eq!(
        flow.connect_with(BackendKind::MetaMask).await.expect("connect"),
        FlowState::Mismatched
    );

    provider.switch_account(&expected).await.expect("switch");
    assert_eq!(
        flow.connect_with(BackendKind::MetaMask).await.expect("reconnect"),
        FlowState::Verified
    );
    assert_eq!(join_requests(&transport)[0].wallet_address, expected);
}

// ════════════════════════════════════════════════════════════════════
// Incomplete parameters
// ════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn missing_parameters_never_join() {
    let queries = [
        "",
        "?gameId=g1&username=bob",
        "?walletAddress=0xabc&username=bob",
        "?walletAddress=0xabc&gameId=g1",
        "?walletAddress=&walletAddress=0xabc&gameId=g1&username=bob",
    ];
    for query in queries {
        let (provider, _address) = local_wallet(1).await;
        let (mut flow, _events) = start_flow(injected_session(&provider), query);
        let transport = MockTransport::connected();

        assert_eq!(flow.state(), FlowState::ManualConnect, "query {query:?}");
        flow.attach_transport(transport.clone()).await;
        let state = flow.connect_with(BackendKind::MetaMask).await.expect("connect");
        assert_eq!(state, FlowState::ManualConnect);
        flow.evaluate().await;
        assert!(transport.emitted().is_empty(), "query {query:?}");
        assert!(!flow.has_joined());
    }
}

#[tokio::test]
async fn manual_connect_still_reports_mismatch() {
    let (provider, _address) = local_wallet(1).await;
    let query = format!("?walletAddress={OTHER_ADDRESS}&gameId=g1");
    let (mut flow, mut events) = start_flow(injected_session(&provider), &query);
    flow.attach_transport(MockTransport::connected()).await;
    flow.connect_with(BackendKind::MetaMask).await.expect("connect");

    assert_eq!(flow.state(), FlowState::ManualConnect);
    assert!(drain_events(&mut events)
        .iter()
        .any(|e| matches!(e, FlowEvent::Notice(Notice::AddressMismatch { .. }))));
}

// ════════════════════════════════════════════════════════════════════
// Transport readiness
// ════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn join_waits_for_transport_to_connect() {
    let (provider, address) = local_wallet(1).await;
    let (mut flow, _events) = start_flow(injected_session(&provider), &join_query(&address));

    assert_eq!(flow.evaluate().await, FlowState::AwaitingTransport);
    let transport = MockTransport::disconnected();
    flow.attach_transport(transport.clone()).await;
    assert_eq!(
        flow.connect_with(BackendKind::MetaMask).await.expect("connect"),
        FlowState::AwaitingTransport
    );
    assert!(transport.emitted().is_empty());

    transport.set_connected(true);
    assert_eq!(flow.evaluate().await, FlowState::Verified);
    assert_eq!(transport.emitted().len(), 1);
}

#[tokio::test]
async fn join_waits_for_socket_id() {
    let (provider, address) = local_wallet(1).await;
    let (mut flow, _events) = start_flow(injected_session(&provider), &join_query(&address));
    let transport = MockTransport::connected();
    transport.set_socket_id(None);
    flow.attach_transport(transport.clone()).await;

    assert_eq!(
        flow.connect_with(BackendKind::MetaMask).await.expect("connect"),
        FlowState::AwaitingVerification
    );
    assert!(transport.emitted().is_empty());

    transport.set_socket_id(Some("sock-9"));
    assert_eq!(flow.evaluate().await, FlowState::Verified);
    assert_eq!(join_requests(&transport)[0].socket_id, "sock-9");
}

#[tokio::test]
async fn failed_emit_is_retried_on_next_evaluation() {
    let (provider, address) = local_wallet(1).await;
    let (mut flow, mut events) = start_flow(injected_session(&provider), &join_query(&address));
    let transport = MockTransport::connected();
    transport.fail_next_emits(1);
    flow.attach_transport(transport.clone()).await;

    let state = flow.connect_with(BackendKind::MetaMask).await.expect("connect");
    assert_eq!(state, FlowState::AwaitingVerification);
    assert!(!flow.has_joined());
    assert!(drain_events(&mut events)
        .iter()
        .any(|e| matches!(e, FlowEvent::Notice(Notice::JoinFailed { .. }))));

    assert_eq!(flow.evaluate().await, FlowState::Verified);
    assert_eq!(transport.emitted().len(), 1);
}

#[tokio::test]
async fn full_event_channel_defers_join_until_drained() {
    let (provider, address) = local_wallet(1).await;
    let (mut flow, mut events) = ConnectFlow::new(
        injected_session(&provider),
        JoinParams::from_query(&join_query(&address)),
        FlowConfig::new().with_event_channel_capacity(4),
    );
    let transport = MockTransport::connected();
    flow.attach_transport(transport.clone()).await;

    // State change, wallet address and the connected notice fill the channel.
    let state = flow.connect_with(BackendKind::MetaMask).await.expect("connect");
    assert_eq!(state, FlowState::AwaitingVerification);
    assert!(transport.emitted().is_empty());
    assert!(!flow.has_joined());
    assert_eq!(drain_events(&mut events).len(), 4);

    assert_eq!(flow.evaluate().await, FlowState::Verified);
    assert_eq!(flow.evaluate().await, FlowState::Verified);
    assert_eq!(transport.emitted().len(), 1);
    assert_eq!(
        drain_events(&mut events),
        vec![
            FlowEvent::StateChanged(FlowState::Verified),
            FlowEvent::LobbyJoined(join_requests(&transport).remove(0)),
            FlowEvent::Navigate {
                route: "/play".into()
            },
        ]
    );
}

#[tokio::test]
async fn detaching_transport_before_join_waits_again() {
    let (provider, _address) = local_wallet(1).await;
    let (mut flow, _events) = start_flow(injected_session(&provider), &join_query(OTHER_ADDRESS));
    flow.attach_transport(MockTransport::connected()).await;
    assert_eq!(flow.detach_transport().await, FlowState::AwaitingTransport);
}

// ════════════════════════════════════════════════════════════════════
// Wallet failures and session changes
// ════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn rejected_connect_reports_wallet_error() {
    let (provider, address) = local_wallet(1).await;
    provider.set_rejecting(true);
    let (mut flow, mut events) = start_flow(injected_session(&provider), &join_query(&address));
    flow.attach_transport(MockTransport::connected()).await;

    let err = flow.connect_with(BackendKind::MetaMask).await.unwrap_err();
    assert_eq!(err.kind, SessionErrorKind::ConnectFailure);
    assert_eq!(flow.state(), FlowState::AwaitingWalletAction);

    let notices: Vec<_> = drain_events(&mut events)
        .into_iter()
        .filter_map(|e| match e {
            FlowEvent::Notice(notice) => Some(notice),
            _ => None,
        })
        .collect();
    assert_eq!(notices.len(), 1, "{notices:?}");
    assert_eq!(notices[0].title(), "Wallet Error");
}

#[tokio::test]
async fn missing_backend_reports_install_hint() {
    let (provider, address) = local_wallet(1).await;
    let (mut flow, mut events) = start_flow(injected_session(&provider), &join_query(&address));
    flow.attach_transport(MockTransport::connected()).await;

    let err = flow.connect_with(BackendKind::Coinbase).await.unwrap_err();
    assert_eq!(err.kind, SessionErrorKind::BackendMissing);
    assert!(drain_events(&mut events)
        .iter()
        .any(|e| matches!(e, FlowEvent::Notice(Notice::WalletError { .. }))));
}

#[tokio::test]
async fn revoked_access_returns_to_wallet_action() {
    let (provider, _address) = local_wallet(1).await;
    let (mut flow, _events) = start_flow(injected_session(&provider), &join_query(OTHER_ADDRESS));
    flow.attach_transport(MockTransport::connected()).await;
    flow.connect_with(BackendKind::MetaMask).await.expect("connect");
    assert_eq!(flow.state(), FlowState::Mismatched);

    provider.revoke_access();
    let state = tokio::time::timeout(std::time::Duration::from_secs(2), async {
        loop {
            let state = flow.next_session_event().await.expect("session alive");
            if state == FlowState::AwaitingWalletAction {
                break state;
            }
        }
    })
    .await
    .expect("flow reacts to revoked access");

    assert_eq!(state, FlowState::AwaitingWalletAction);
    assert!(flow.verification().is_none());
    assert!(!flow.session().is_connected().await);
}

#[tokio::test]
async fn chain_change_is_reported_to_host() {
    let (provider, _address) = local_wallet(1).await;
    let (mut flow, mut events) =
        start_flow(injected_session(&provider), &join_query(OTHER_ADDRESS));
    flow.attach_transport(MockTransport::connected()).await;
    flow.connect_with(BackendKind::MetaMask).await.expect("connect");
    assert_eq!(flow.state(), FlowState::Mismatched);
    drain_events(&mut events);

    provider.switch_chain("0x89");
    let state = tokio::time::timeout(std::time::Duration::from_secs(2), async {
        loop {
            let state = flow.next_session_event().await.expect("session alive");
            if state == FlowState::AwaitingWalletAction {
                break state;
            }
        }
    })
    .await
    .expect("flow reacts to chain change");

    assert_eq!(state, FlowState::AwaitingWalletAction);
    assert_eq!(
        drain_events(&mut events),
        vec![
            FlowEvent::ChainChanged {
                chain_id: "0x89".into()
            },
            FlowEvent::StateChanged(FlowState::AwaitingWalletAction),
        ]
    );
}

#[tokio::test]
async fn verified_flow_ignores_later_disconnect() {
    let (provider, address) = local_wallet(1).await;
    let (mut flow, _events) = start_flow(injected_session(&provider), &join_query(&address));
    let transport = MockTransport::connected();
    flow.attach_transport(transport.clone()).await;
    flow.connect_with(BackendKind::MetaMask).await.expect("connect");

    flow.session().disconnect().await;
    assert_eq!(flow.evaluate().await, FlowState::Verified);
    assert_eq!(flow.detach_transport().await, FlowState::Verified);
    assert_eq!(transport.emitted().len(), 1);
}

#[tokio::test]
async fn custom_config_changes_route_and_message() {
    let (provider, address) = local_wallet(1).await;
    let session = injected_session(&provider);
    let config = FlowConfig::new()
        .with_confirmation_message("Sit me down")
        .with_play_route("/table");
    let (mut flow, mut events) = ConnectFlow::new(
        Arc::clone(&session),
        JoinParams::from_query(&join_query(&address)),
        config,
    );
    flow.attach_transport(MockTransport::connected()).await;
    flow.connect_with(BackendKind::MetaMask).await.expect("connect");

    let signature = session.last_signature().await.expect("signature");
    let recovered =
        wallet_lobby_client::eip191::recover_address(b"Sit me down", &signature).expect("recover");
    assert_eq!(recovered, address);
    assert!(drain_events(&mut events).contains(&FlowEvent::Navigate {
        route: "/table".into()
    }));
}
