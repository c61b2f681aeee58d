//! The connect-and-join flow.
//!
//! [`ConnectFlow`] sits on top of a shared [`WalletSession`]. Given the
//! expected identity from the page's query string and the lobby transport, it
//! decides when the player is verified and then emits the lobby-join event
//! exactly once. Everything the host should show or do is published as a
//! [`FlowEvent`] on a bounded channel returned from [`ConnectFlow::new`].
//!
//! ```text
//!  AwaitingTransport ──transport ready──▶ AwaitingWalletAction
//!                                              │ connect_with()
//!                                              ▼
//!                                     AwaitingVerification
//!                          address matches │         │ address differs
//!                                          ▼         ▼
//!                                      Verified   Mismatched ──connect_with()──▶ …
//!
//!  incomplete query parameters ──▶ ManualConnect (never joins)
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! let params = JoinParams::from_query(query);
//! let (mut flow, mut events) = ConnectFlow::new(session, params, FlowConfig::default());
//! flow.attach_transport(socket).await;
//!
//! flow.connect_with(BackendKind::MetaMask).await?;
//! while let Ok(event) = events.try_recv() {
//!     match event {
//!         FlowEvent::Notice(notice) => show_alert(notice.title(), &notice.text()),
//!         FlowEvent::Navigate { route } => router.push(route),
//!         _ => {}
//!     }
//! }
//! ```

use std::sync::Arc;

use tokio::sync::{broadcast, mpsc};
use tracing::{debug, error, info, warn};

use crate::address::{addresses_match, short_address, VerificationResult};
use crate::backend::BackendKind;
use crate::error::SessionError;
use crate::params::JoinParams;
use crate::protocol::{ClientEvent, LobbyJoinRequest};
use crate::session::{SessionEvent, WalletSession};
use crate::transport::Transport;

/// Default capacity of the flow event channel.
const DEFAULT_EVENT_CHANNEL_CAPACITY: usize = 64;

/// Events published together when the lobby join succeeds: the state change,
/// the join payload and the navigation.
const JOIN_EVENT_COUNT: usize = 3;

/// Message signed right after a successful connect.
pub const DEFAULT_CONFIRMATION_MESSAGE: &str = "Connected successfully";

/// Route the host navigates to after joining.
pub const DEFAULT_PLAY_ROUTE: &str = "/play";

// ── Configuration ───────────────────────────────────────────────────

/// Configuration for a [`ConnectFlow`].
///
/// # Example
///
/// ```
/// use wallet_lobby_client::flow::FlowConfig;
///
/// let config = FlowConfig::new()
///     .with_confirmation_message("Join table")
///     .with_play_route("/table");
/// assert_eq!(config.play_route, "/table");
/// ```
#[derive(Debug, Clone)]
pub struct FlowConfig {
    /// Message the wallet signs after connecting.
    pub confirmation_message: String,
    /// Route published in [`FlowEvent::Navigate`] after joining.
    pub play_route: String,
    /// Capacity of the bounded event channel.
    ///
    /// When the host does not drain events, further events are dropped with a
    /// warning, and the lobby join waits until there is room for its events.
    /// Defaults to **64**. Values below 3 are clamped to 3.
    pub event_channel_capacity: usize,
}

impl FlowConfig {
    pub fn new() -> Self {
        Self {
            confirmation_message: DEFAULT_CONFIRMATION_MESSAGE.to_string(),
            play_route: DEFAULT_PLAY_ROUTE.to_string(),
            event_channel_capacity: DEFAULT_EVENT_CHANNEL_CAPACITY,
        }
    }

    #[must_use]
    pub fn with_confirmation_message(mut self, message: impl Into<String>) -> Self {
        self.confirmation_message = message.into();
        self
    }

    #[must_use]
    pub fn with_play_route(mut self, route: impl Into<String>) -> Self {
        self.play_route = route.into();
        self
    }

    #[must_use]
    pub fn with_event_channel_capacity(mut self, capacity: usize) -> Self {
        self.event_channel_capacity = capacity.max(JOIN_EVENT_COUNT);
        self
    }
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self::new()
    }
}

// ── States and events ───────────────────────────────────────────────

/// Position of a [`ConnectFlow`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlowState {
    /// Waiting for a connected transport.
    AwaitingTransport,
    /// Query parameters are incomplete: the player may connect a wallet, but
    /// no automatic join ever happens.
    ManualConnect,
    /// Transport ready, waiting for the player to pick a wallet.
    AwaitingWalletAction,
    /// A connect is in progress or the join is pending.
    AwaitingVerification,
    /// Joined the lobby. Terminal.
    Verified,
    /// Connected wallet differs from the expected address. The player may
    /// connect again.
    Mismatched,
}

impl FlowState {
    /// Returns `true` for states the flow never leaves.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Verified | Self::ManualConnect)
    }
}

/// A user-facing alert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// A wallet connected.
    Connected { address: String },
    /// The connected wallet is not the expected one.
    AddressMismatch { expected: String, actual: String },
    /// The wallet session reported an error.
    WalletError { message: String },
    /// The lobby-join event could not be sent.
    JoinFailed { message: String },
}

impl Notice {
    pub fn title(&self) -> &'static str {
        match self {
            Self::Connected { .. } => "Wallet Connected",
            Self::AddressMismatch { .. } => "Wallet Mismatch",
            Self::WalletError { .. } => "Wallet Error",
            Self::JoinFailed { .. } => "Join Failed",
        }
    }

    pub fn text(&self) -> String {
        match self {
            Self::Connected { address } => {
                format!("Connected with address: {}", short_address(address))
            }
            Self::AddressMismatch { .. } => {
                "The connected wallet does not match the expected wallet address.".to_string()
            }
            Self::WalletError { message } | Self::JoinFailed { message } => message.clone(),
        }
    }

    /// Returns `true` for notices that should be shown as errors.
    pub fn is_error(&self) -> bool {
        !matches!(self, Self::Connected { .. })
    }
}

/// Everything a [`ConnectFlow`] asks its host to show or do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowEvent {
    /// The flow moved to a new state.
    StateChanged(FlowState),
    /// Show an alert.
    Notice(Notice),
    /// The connected wallet address, for the host's player record.
    WalletAddress(String),
    /// The lobby-join event was emitted with this payload.
    LobbyJoined(LobbyJoinRequest),
    /// Navigate to the play screen.
    Navigate { route: String },
    /// The wallet switched networks and the session was cleared. The host
    /// decides whether to reload.
    ChainChanged { chain_id: String },
}

// ── Flow ────────────────────────────────────────────────────────────

/// Drives wallet connection, address verification and the lobby join.
///
/// Re-evaluation is idempotent: calling [`evaluate`](Self::evaluate) any
/// number of times emits the lobby-join event at most once per flow.
pub struct ConnectFlow {
    session: Arc<WalletSession>,
    params: JoinParams,
    config: FlowConfig,
    transport: Option<Arc<dyn Transport>>,
    state: FlowState,
    verification: Option<VerificationResult>,
    joined: bool,
    session_events: broadcast::Receiver<SessionEvent>,
    event_tx: mpsc::Sender<FlowEvent>,
}

impl ConnectFlow {
    /// Create a flow and return it with its event receiver.
    ///
    /// Starts in [`FlowState::ManualConnect`] when `params` is incomplete,
    /// otherwise in [`FlowState::AwaitingTransport`].
    #[must_use = "the event receiver must be used to receive flow events"]
    pub fn new(
        session: Arc<WalletSession>,
        params: JoinParams,
        config: FlowConfig,
    ) -> (Self, mpsc::Receiver<FlowEvent>) {
        let capacity = config.event_channel_capacity.max(JOIN_EVENT_COUNT);
        let (event_tx, event_rx) = mpsc::channel(capacity);
        let state = if params.is_complete() {
            FlowState::AwaitingTransport
        } else {
            info!("join parameters incomplete, automatic lobby join disabled");
            FlowState::ManualConnect
        };
        let session_events = session.subscribe();

        let flow = Self {
            session,
            params,
            config,
            transport: None,
            state,
            verification: None,
            joined: false,
            session_events,
            event_tx,
        };
        (flow, event_rx)
    }

    // ── Inputs ──────────────────────────────────────────────────────

    /// Use `transport` for the lobby join and re-evaluate.
    pub async fn attach_transport(&mut self, transport: Arc<dyn Transport>) -> FlowState {
        debug!(socket_id = ?transport.socket_id(), "transport attached");
        self.transport = Some(transport);
        self.evaluate().await
    }

    /// Forget the transport and re-evaluate.
    pub async fn detach_transport(&mut self) -> FlowState {
        debug!("transport detached");
        self.transport = None;
        self.evaluate().await
    }

    /// Connect through `backend`, sign the confirmation message and check the
    /// connected address against the expected one.
    ///
    /// Ignored once the flow is [`Verified`](FlowState::Verified). Allowed
    /// after a mismatch, in which case the new connection is checked afresh.
    ///
    /// # Errors
    ///
    /// Returns the session's [`SessionError`] if the connect fails. The
    /// failure has already been published as a [`Notice::WalletError`].
    pub async fn connect_with(&mut self, backend: BackendKind) -> Result<FlowState, SessionError> {
        if self.state == FlowState::Verified {
            debug!("flow already verified, ignoring connect request");
            return Ok(self.state);
        }
        self.drain_session_events();
        if !self.state.is_terminal() {
            self.set_state(FlowState::AwaitingVerification);
        }

        let connection = match self.session.connect(backend).await {
            Ok(connection) => connection,
            Err(err) => {
                self.evaluate().await;
                return Err(err);
            }
        };
        let address = connection.active_account().to_string();

        // The signature is only logged; nothing downstream checks it.
        match self.session.sign(&self.config.confirmation_message).await {
            Ok(signature) => info!(%signature, "signed confirmation message"),
            Err(err) => warn!("confirmation signature failed: {err}"),
        }

        self.emit(FlowEvent::WalletAddress(address.clone()));
        self.emit(FlowEvent::Notice(Notice::Connected {
            address: address.clone(),
        }));

        if let Some(expected) = self.params.wallet_address.clone() {
            let verification = VerificationResult::new(expected.clone(), address.clone());
            info!(
                matches = verification.matches(),
                connected = %address,
                expected = %expected,
                "wallet address check"
            );
            if !verification.matches() {
                self.emit(FlowEvent::Notice(Notice::AddressMismatch {
                    expected,
                    actual: address,
                }));
            }
            self.verification = Some(verification);
        }

        Ok(self.evaluate().await)
    }

    /// Wait for the next wallet session change and re-evaluate.
    ///
    /// Returns `None` once the session's event channel is closed.
    pub async fn next_session_event(&mut self) -> Option<FlowState> {
        loop {
            match self.session_events.recv().await {
                Ok(event) => {
                    self.handle_session_event(event);
                    return Some(self.evaluate().await);
                }
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    warn!("flow lagged behind wallet session, {missed} events dropped");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Re-derive the state from the transport, the session and the current
    /// verification. Emits the lobby-join event when the player is verified
    /// and it has not been emitted yet.
    pub async fn evaluate(&mut self) -> FlowState {
        self.drain_session_events();
        if self.state.is_terminal() {
            return self.state;
        }

        let transport_ready = self.transport.as_ref().is_some_and(|t| t.is_connected());
        if !transport_ready {
            self.set_state(FlowState::AwaitingTransport);
            return self.state;
        }

        let Some(connection) = self.session.connection().await else {
            self.verification = None;
            self.set_state(FlowState::AwaitingWalletAction);
            return self.state;
        };
        let active = connection.active_account().to_string();

        let check = self
            .verification
            .as_ref()
            .map(|v| (addresses_match(v.actual_address(), &active), v.matches()));
        match check {
            Some((false, _)) => {
                debug!("active account changed since verification, discarding result");
                self.verification = None;
                self.set_state(FlowState::AwaitingWalletAction);
            }
            Some((true, true)) => self.join(active).await,
            Some((true, false)) => self.set_state(FlowState::Mismatched),
            None => self.set_state(FlowState::AwaitingWalletAction),
        }
        self.state
    }

    // ── State accessors ─────────────────────────────────────────────

    pub fn state(&self) -> FlowState {
        self.state
    }

    /// Result of the last address check, if one was made for the current
    /// connection.
    pub fn verification(&self) -> Option<&VerificationResult> {
        self.verification.as_ref()
    }

    pub fn params(&self) -> &JoinParams {
        &self.params
    }

    /// Returns `true` once the lobby-join event has been emitted.
    pub fn has_joined(&self) -> bool {
        self.joined
    }

    pub fn session(&self) -> &Arc<WalletSession> {
        &self.session
    }

    // ── Internal helpers ────────────────────────────────────────────

    async fn join(&mut self, wallet_address: String) {
        if self.joined {
            return;
        }
        let Some(transport) = self.transport.clone() else {
            return;
        };
        let (Some(game_id), Some(username)) =
            (self.params.game_id.clone(), self.params.username.clone())
        else {
            return;
        };
        let Some(socket_id) = transport.socket_id() else {
            debug!("transport has no socket id yet, deferring lobby join");
            self.set_state(FlowState::AwaitingVerification);
            return;
        };

        // The join is only sent once the host is sure to hear about it.
        let event_tx = self.event_tx.clone();
        let permits = match event_tx.try_reserve_many(JOIN_EVENT_COUNT) {
            Ok(permits) => Some(permits),
            Err(mpsc::error::TrySendError::Full(())) => {
                warn!("flow event channel full, deferring lobby join");
                self.set_state(FlowState::AwaitingVerification);
                return;
            }
            Err(mpsc::error::TrySendError::Closed(())) => {
                debug!("flow event channel closed, joining without host events");
                None
            }
        };

        let request = LobbyJoinRequest {
            wallet_address,
            socket_id,
            game_id,
            username,
        };
        match transport
            .emit(ClientEvent::FetchLobbyInfo(request.clone()))
            .await
        {
            Ok(()) => {
                info!(
                    game_id = %request.game_id,
                    username = %request.username,
                    "lobby join requested"
                );
                self.joined = true;
                debug!(from = ?self.state, to = ?FlowState::Verified, "flow state changed");
                self.state = FlowState::Verified;
                let events = [
                    FlowEvent::StateChanged(FlowState::Verified),
                    FlowEvent::LobbyJoined(request),
                    FlowEvent::Navigate {
                        route: self.config.play_route.clone(),
                    },
                ];
                if let Some(permits) = permits {
                    for (permit, event) in permits.zip(events) {
                        permit.send(event);
                    }
                }
            }
            Err(e) => {
                drop(permits);
                error!("failed to emit lobby join: {e}");
                self.emit(FlowEvent::Notice(Notice::JoinFailed {
                    message: e.to_string(),
                }));
                self.set_state(FlowState::AwaitingVerification);
            }
        }
    }

    fn drain_session_events(&mut self) {
        loop {
            match self.session_events.try_recv() {
                Ok(event) => self.handle_session_event(event),
                Err(broadcast::error::TryRecvError::Lagged(missed)) => {
                    warn!("flow lagged behind wallet session, {missed} events dropped");
                }
                Err(_) => break,
            }
        }
    }

    fn handle_session_event(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::Error(err) if self.state != FlowState::Verified => {
                self.emit(FlowEvent::Notice(Notice::WalletError {
                    message: err.message,
                }));
            }
            SessionEvent::ChainChanged { chain_id } => {
                info!(chain_id = %chain_id, "wallet session cleared by chain change");
                self.emit(FlowEvent::ChainChanged { chain_id });
            }
            other => debug!("session event: {other:?}"),
        }
    }

    fn set_state(&mut self, state: FlowState) {
        if self.state != state {
            debug!(from = ?self.state, to = ?state, "flow state changed");
            self.state = state;
            self.emit(FlowEvent::StateChanged(state));
        }
    }

    /// Emit an event to the event channel. If the channel is full, log a
    /// warning and drop the event.
    fn emit(&self, event: FlowEvent) {
        match self.event_tx.try_send(event) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(dropped)) => {
                warn!("flow event channel full, dropping event: {dropped:?}");
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                debug!("flow event channel closed, receiver dropped");
            }
        }
    }
}

impl std::fmt::Debug for ConnectFlow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectFlow")
            .field("state", &self.state)
            .field("params", &self.params)
            .field("verification", &self.verification)
            .field("joined", &self.joined)
            .field("has_transport", &self.transport.is_some())
            .finish()
    }
}

// ── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
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
    use crate::backend::WalletBackends;
    use crate::backends::LocalWalletProvider;
    use crate::error::TransportError;
    use crate::session::SessionConfig;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex as StdMutex;

    // ── Mock transport ──────────────────────────────────────────────

    /// Records emitted events; readiness can be toggled.
    struct MockTransport {
        connected: AtomicBool,
        emitted: StdMutex<Vec<ClientEvent>>,
    }

    impl MockTransport {
        fn new(connected: bool) -> Arc<Self> {
            Arc::new(Self {
                connected: AtomicBool::new(connected),
                emitted: StdMutex::new(Vec::new()),
            })
        }

        fn emitted(&self) -> Vec<ClientEvent> {
            self.emitted.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Transport for MockTransport {
        fn is_connected(&self) -> bool {
            self.connected.load(Ordering::Acquire)
        }

        fn socket_id(&self) -> Option<String> {
            Some("sock-1".into())
        }

        async fn emit(&self, event: ClientEvent) -> std::result::Result<(), TransportError> {
            self.emitted.lock().unwrap().push(event);
            Ok(())
        }
    }

    // ── Helpers ─────────────────────────────────────────────────────

    async fn setup(
        expected: Option<&str>,
    ) -> (
        ConnectFlow,
        mpsc::Receiver<FlowEvent>,
        Arc<LocalWalletProvider>,
        String,
    ) {
        let provider = Arc::new(LocalWalletProvider::random(2));
        let address = provider.accounts().await.remove(0);
        let session = Arc::new(WalletSession::new(
            WalletBackends::new().with_injected(provider.clone()),
            SessionConfig::default(),
        ));
        let expected = expected.map(str::to_string).unwrap_or_else(|| address.clone());
        let params = JoinParams::new(expected, "g1", "bob");
        let (flow, events) = ConnectFlow::new(session, params, FlowConfig::default());
        (flow, events, provider, address)
    }

    fn drain(events: &mut mpsc::Receiver<FlowEvent>) -> Vec<FlowEvent> {
        let mut out = Vec::new();
        while let Ok(event) = events.try_recv() {
            out.push(event);
        }
        out
    }

    // ── Tests ───────────────────────────────────────────────────────

    #[tokio::test]
    async fn starts_awaiting_transport_with_complete_params() {
        let (flow, _events, _provider, _address) = setup(None).await;
        assert_eq!(flow.state(), FlowState::AwaitingTransport);
    }

    #[tokio::test]
    async fn ready_transport_moves_to_wallet_action() {
        let (mut flow, _events, _provider, _address) = setup(None).await;
        let state = flow.attach_transport(MockTransport::new(true)).await;
        assert_eq!(state, FlowState::AwaitingWalletAction);
    }

    #[tokio::test]
    async fn disconnected_transport_keeps_waiting() {
        let (mut flow, _events, _provider, _address) = setup(None).await;
        let state = flow.attach_transport(MockTransport::new(false)).await;
        assert_eq!(state, FlowState::AwaitingTransport);
    }

    #[tokio::test]
    async fn matching_address_joins_once() {
        let (mut flow, mut events, _provider, address) = setup(None).await;
        let transport = MockTransport::new(true);
        flow.attach_transport(transport.clone()).await;

        let state = flow.connect_with(BackendKind::MetaMask).await.unwrap();
        assert_eq!(state, FlowState::Verified);
        assert!(flow.has_joined());

        flow.evaluate().await;
        flow.evaluate().await;

        let emitted = transport.emitted();
        assert_eq!(emitted.len(), 1);
        let ClientEvent::FetchLobbyInfo(request) = &emitted[0];
        assert_eq!(request.wallet_address, address);
        assert_eq!(request.socket_id, "sock-1");

        let events = drain(&mut events);
        let navigations = events
            .iter()
            .filter(|e| matches!(e, FlowEvent::Navigate { .. }))
            .count();
        assert_eq!(navigations, 1);
    }

    #[tokio::test]
    async fn matching_is_case_insensitive() {
        let provider = Arc::new(LocalWalletProvider::random(1));
        let active = provider.accounts().await.remove(0);
        let session = Arc::new(WalletSession::new(
            WalletBackends::new().with_injected(provider),
            SessionConfig::default(),
        ));
        let params = JoinParams::new(active.to_ascii_lowercase(), "g1", "bob");
        let (mut flow, _events) = ConnectFlow::new(session, params, FlowConfig::default());
        flow.attach_transport(MockTransport::new(true)).await;
        assert_eq!(
            flow.connect_with(BackendKind::MetaMask).await.unwrap(),
            FlowState::Verified
        );
    }

    #[tokio::test]
    async fn mismatched_address_never_joins() {
        let (mut flow, mut events, _provider, _address) =
            setup(Some("0xBBB0000000000000000000000000000000000002")).await;
        let transport = MockTransport::new(true);
        flow.attach_transport(transport.clone()).await;

        let state = flow.connect_with(BackendKind::MetaMask).await.unwrap();
        assert_eq!(state, FlowState::Mismatched);
        assert!(!flow.verification().unwrap().matches());
        assert!(transport.emitted().is_empty());

        let events = drain(&mut events);
        assert!(events.iter().any(|e| matches!(
            e,
            FlowEvent::Notice(Notice::AddressMismatch { .. })
        )));
        assert!(!events
            .iter()
            .any(|e| matches!(e, FlowEvent::Navigate { .. })));
    }

    #[tokio::test]
    async fn mismatch_allows_manual_retry_with_other_account() {
        let provider = Arc::new(LocalWalletProvider::random(2));
        let accounts = provider.accounts().await;
        let session = Arc::new(WalletSession::new(
            WalletBackends::new().with_injected(provider.clone()),
            SessionConfig::default(),
        ));
        // Expect the second account, connect with the first.
        let params = JoinParams::new(accounts[1].clone(), "g1", "bob");
        let (mut flow, _events) = ConnectFlow::new(session, params, FlowConfig::default());
        let transport = MockTransport::new(true);
        flow.attach_transport(transport.clone()).await;

        assert_eq!(
            flow.connect_with(BackendKind::MetaMask).await.unwrap(),
            FlowState::Mismatched
        );

        provider.switch_account(&accounts[1]).await.unwrap();
        assert_eq!(
            flow.connect_with(BackendKind::MetaMask).await.unwrap(),
            FlowState::Verified
        );
        assert_eq!(transport.emitted().len(), 1);
    }

    #[tokio::test]
    async fn connect_failure_surfaces_notice_and_returns_to_wallet_action() {
        let (mut flow, mut events, provider, _address) = setup(None).await;
        flow.attach_transport(MockTransport::new(true)).await;
        provider.set_rejecting(true);

        let err = flow.connect_with(BackendKind::MetaMask).await.unwrap_err();
        assert_eq!(err.kind, crate::error::SessionErrorKind::ConnectFailure);
        assert_eq!(flow.state(), FlowState::AwaitingWalletAction);

        let events = drain(&mut events);
        assert!(events
            .iter()
            .any(|e| matches!(e, FlowEvent::Notice(Notice::WalletError { .. }))));
    }

    #[tokio::test]
    async fn verification_waits_for_transport() {
        let (mut flow, _events, _provider, _address) = setup(None).await;
        let transport = MockTransport::new(false);
        flow.attach_transport(transport.clone()).await;

        let state = flow.connect_with(BackendKind::MetaMask).await.unwrap();
        assert_eq!(state, FlowState::AwaitingTransport);
        assert!(transport.emitted().is_empty());

        transport.connected.store(true, Ordering::Release);
        assert_eq!(flow.evaluate().await, FlowState::Verified);
        assert_eq!(transport.emitted().len(), 1);
    }

    #[tokio::test]
    async fn incomplete_params_stay_manual() {
        let provider = Arc::new(LocalWalletProvider::random(1));
        let session = Arc::new(WalletSession::new(
            WalletBackends::new().with_injected(provider),
            SessionConfig::default(),
        ));
        let (mut flow, mut events) =
            ConnectFlow::new(session, JoinParams::default(), FlowConfig::default());
        let transport = MockTransport::new(true);

        assert_eq!(flow.state(), FlowState::ManualConnect);
        flow.attach_transport(transport.clone()).await;
        let state = flow.connect_with(BackendKind::MetaMask).await.unwrap();

        assert_eq!(state, FlowState::ManualConnect);
        assert!(transport.emitted().is_empty());
        assert!(flow.verification().is_none());
        let events = drain(&mut events);
        assert!(events
            .iter()
            .any(|e| matches!(e, FlowEvent::WalletAddress(_))));
        assert!(!events
            .iter()
            .any(|e| matches!(e, FlowEvent::StateChanged(_))));
    }

    #[tokio::test]
    async fn session_disconnect_clears_verification() {
        let (mut flow, _events, _provider, _address) =
            setup(Some("0xBBB0000000000000000000000000000000000002")).await;
        flow.attach_transport(MockTransport::new(true)).await;
        flow.connect_with(BackendKind::MetaMask).await.unwrap();
        assert_eq!(flow.state(), FlowState::Mismatched);

        flow.session().disconnect().await;
        assert_eq!(flow.evaluate().await, FlowState::AwaitingWalletAction);
        assert!(flow.verification().is_none());
    }

    #[tokio::test]
    async fn connect_after_verified_is_ignored() {
        let (mut flow, _events, _provider, _address) = setup(None).await;
        let transport = MockTransport::new(true);
        flow.attach_transport(transport.clone()).await;
        flow.connect_with(BackendKind::MetaMask).await.unwrap();

        let state = flow.connect_with(BackendKind::MetaMask).await.unwrap();
        assert_eq!(state, FlowState::Verified);
        assert_eq!(transport.emitted().len(), 1);
    }

    #[test]
    fn event_channel_keeps_room_for_join_events() {
        let config = FlowConfig::new().with_event_channel_capacity(0);
        assert_eq!(config.event_channel_capacity, JOIN_EVENT_COUNT);
    }

    #[tokio::test]
    async fn chain_change_is_forwarded() {
        let (mut flow, mut events, provider, _address) =
            setup(Some("0xBBB0000000000000000000000000000000000002")).await;
        flow.attach_transport(MockTransport::new(true)).await;
        flow.connect_with(BackendKind::MetaMask).await.unwrap();
        drain(&mut events);

        provider.switch_chain("0x1");
        assert_eq!(
            flow.next_session_event().await,
            Some(FlowState::AwaitingWalletAction)
        );
        assert_eq!(
            drain(&mut events)[0],
            FlowEvent::ChainChanged {
                chain_id: "0x1".into()
            }
        );
    }

    #[test]
    fn notice_texts() {
        let notice = Notice::Connected {
            address: "0x2c7536E3605D9C16a7a3D7b1898e529396a65c23".into(),
        };
        assert_eq!(notice.title(), "Wallet Connected");
        assert_eq!(notice.text(), "Connected with address: 0x2c75...5c23");
        assert!(!notice.is_error());
        assert!(Notice::AddressMismatch {
            expected: "a".into(),
            actual: "b".into()
        }
        .is_error());
    }
}
