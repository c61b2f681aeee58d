//! Wallet session: connection state plus connect / sign / disconnect.
//!
//! [`WalletSession`] is an explicitly constructed object. Share it by
//! reference (typically `Arc<WalletSession>`) with whichever component needs
//! wallet access; only one session should be live per injected provider so
//! change listeners are not duplicated.
//!
//! Every operation converts backend failures into a [`SessionError`], records
//! it as the session's last error and publishes it as a
//! [`SessionEvent::Error`]. Nothing a backend does can make the session
//! panic.
//!
//! # Example
//!
//! ```rust,ignore
//! let backends = WalletBackends::new().with_injected(provider);
//! let session = WalletSession::new(backends, SessionConfig::default());
//!
//! let connection = session.connect(BackendKind::MetaMask).await?;
//! let signature = session.sign("Connected successfully").await?;
//! session.disconnect().await;
//! ```

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex as StdMutex, Weak};

use tokio::sync::{broadcast, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::backend::{BackendKind, ProviderEvent, Signer, WalletBackends, WalletProvider};
use crate::error::{BackendError, Result, SessionError};

/// Default capacity of the session event channel.
const DEFAULT_EVENT_CHANNEL_CAPACITY: usize = 64;

/// Message recorded when signing is attempted without a connection.
pub const NOT_CONNECTED: &str = "Wallet not connected";

// ── Configuration ───────────────────────────────────────────────────

/// Configuration for a [`WalletSession`].
///
/// # Example
///
/// ```
/// use wallet_lobby_client::session::SessionConfig;
///
/// let config = SessionConfig::new().with_event_channel_capacity(8);
/// assert_eq!(config.event_channel_capacity, 8);
/// ```
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Capacity of the broadcast channel behind [`WalletSession::subscribe`].
    ///
    /// Slow subscribers miss the oldest events once it fills up.
    /// Defaults to **64**. Values below 1 are clamped to 1.
    pub event_channel_capacity: usize,
}

impl SessionConfig {
    pub fn new() -> Self {
        Self {
            event_channel_capacity: DEFAULT_EVENT_CHANNEL_CAPACITY,
        }
    }

    #[must_use]
    pub fn with_event_channel_capacity(mut self, capacity: usize) -> Self {
        self.event_channel_capacity = capacity.max(1);
        self
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::new()
    }
}

// ── Connection record ───────────────────────────────────────────────

/// A live wallet connection.
///
/// Holding one implies at least one account and a signer bound to the first.
#[derive(Clone)]
pub struct WalletConnection {
    backend: BackendKind,
    accounts: Vec<String>,
    provider: Arc<dyn WalletProvider>,
    signer: Arc<dyn Signer>,
}

impl WalletConnection {
    pub fn backend(&self) -> BackendKind {
        self.backend
    }

    /// Exposed accounts, active first.
    pub fn accounts(&self) -> &[String] {
        &self.accounts
    }

    /// The active account, which is the signer's address.
    pub fn active_account(&self) -> &str {
        self.signer.address()
    }

    pub fn provider(&self) -> &Arc<dyn WalletProvider> {
        &self.provider
    }

    pub fn signer(&self) -> &Arc<dyn Signer> {
        &self.signer
    }
}

impl fmt::Debug for WalletConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalletConnection")
            .field("backend", &self.backend)
            .field("accounts", &self.accounts)
            .finish_non_exhaustive()
    }
}

// ── Events ──────────────────────────────────────────────────────────

/// Changes published by a [`WalletSession`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// A connect call succeeded.
    Connected {
        backend: BackendKind,
        address: String,
    },
    /// The backend reported a new, non-empty account list.
    AccountsChanged { accounts: Vec<String> },
    /// The backend switched networks. The session has been cleared; the
    /// host is expected to reload or re-derive its environment.
    ChainChanged { chain_id: String },
    /// The connection was cleared.
    Disconnected { reason: Option<String> },
    /// An operation failed.
    Error(SessionError),
}

// ── Shared state ────────────────────────────────────────────────────

struct SessionState {
    connection: Option<WalletConnection>,
    last_error: Option<SessionError>,
    last_signature: Option<String>,
    /// Bumped whenever the connection is replaced or cleared, so events from
    /// a detached listener are ignored.
    generation: u64,
}

struct Shared {
    state: Mutex<SessionState>,
    in_flight: AtomicUsize,
    listener: StdMutex<Option<JoinHandle<()>>>,
    event_tx: broadcast::Sender<SessionEvent>,
}

impl Shared {
    fn emit(&self, event: SessionEvent) {
        if self.event_tx.send(event).is_err() {
            debug!("no session subscribers");
        }
    }

    /// Abort the change listener of the current connection, if any.
    fn detach_listener(&self) {
        let handle = match self.listener.lock() {
            Ok(mut listener) => listener.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        if let Some(handle) = handle {
            debug!("detaching provider listener");
            handle.abort();
        }
    }

    fn attach_listener(&self, handle: JoinHandle<()>) {
        let previous = match self.listener.lock() {
            Ok(mut listener) => listener.replace(handle),
            Err(poisoned) => poisoned.into_inner().replace(handle),
        };
        if let Some(previous) = previous {
            previous.abort();
        }
    }

    /// Clear the connection and signature, detach the listener and return
    /// what was cleared. Performs no awaits.
    fn clear(&self, state: &mut SessionState) -> Option<WalletConnection> {
        state.generation = state.generation.wrapping_add(1);
        state.last_signature = None;
        self.detach_listener();
        state.connection.take()
    }

    fn fail(&self, state: &mut SessionState, err: SessionError) -> SessionError {
        warn!(kind = %err.kind, "wallet session error: {}", err.message);
        state.last_error = Some(err.clone());
        self.emit(SessionEvent::Error(err.clone()));
        err
    }

    async fn handle_provider_event(&self, event: ProviderEvent, generation: u64) {
        let mut state = self.state.lock().await;
        if state.generation != generation {
            debug!("ignoring provider event from a detached connection");
            return;
        }

        match event {
            ProviderEvent::AccountsChanged(accounts) => {
                let Some(first) = accounts.first() else {
                    info!("wallet reported no accounts, disconnecting");
                    if self.clear(&mut state).is_some() {
                        self.emit(SessionEvent::Disconnected {
                            reason: Some("wallet reported no accounts".into()),
                        });
                    }
                    return;
                };
                let Some(connection) = state.connection.as_ref() else {
                    return;
                };
                let provider = Arc::clone(&connection.provider);
                match provider.signer(first).await {
                    Ok(signer) => {
                        debug!(active = %signer.address(), "wallet accounts changed");
                        if let Some(connection) = state.connection.as_mut() {
                            connection.accounts = accounts.clone();
                            connection.signer = signer;
                        }
                        self.emit(SessionEvent::AccountsChanged { accounts });
                    }
                    Err(e) => {
                        self.clear(&mut state);
                        self.fail(&mut state, SessionError::connect_failure(e.to_string()));
                        self.emit(SessionEvent::Disconnected {
                            reason: Some("signer unavailable for new account".into()),
                        });
                    }
                }
            }
            ProviderEvent::ChainChanged(chain_id) => {
                info!(chain_id = %chain_id, "wallet switched chains, clearing session");
                self.clear(&mut state);
                self.emit(SessionEvent::ChainChanged { chain_id });
            }
        }
    }
}

/// Keeps the in-flight counter raised for the lifetime of an operation.
struct LoadingGuard<'a>(&'a AtomicUsize);

impl<'a> LoadingGuard<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::AcqRel);
        Self(counter)
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::AcqRel);
    }
}

/// Background task forwarding provider notifications into the session.
///
/// Holds only a weak reference so a dropped session is not kept alive.
async fn provider_listener(
    shared: Weak<Shared>,
    mut events: broadcast::Receiver<ProviderEvent>,
    generation: u64,
) {
    debug!(generation, "provider listener started");
    loop {
        match events.recv().await {
            Ok(event) => {
                let Some(shared) = shared.upgrade() else {
                    break;
                };
                shared.handle_provider_event(event, generation).await;
            }
            Err(broadcast::error::RecvError::Lagged(missed)) => {
                warn!("provider listener lagged, {missed} notifications dropped");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
    debug!(generation, "provider listener exited");
}

// ── Session handle ──────────────────────────────────────────────────

/// Owns the wallet connection and exposes connect / sign / disconnect.
pub struct WalletSession {
    backends: WalletBackends,
    shared: Arc<Shared>,
}

impl WalletSession {
    pub fn new(backends: WalletBackends, config: SessionConfig) -> Self {
        let (event_tx, _) = broadcast::channel(config.event_channel_capacity.max(1));
        let shared = Arc::new(Shared {
            state: Mutex::new(SessionState {
                connection: None,
                last_error: None,
                last_signature: None,
                generation: 0,
            }),
            in_flight: AtomicUsize::new(0),
            listener: StdMutex::new(None),
            event_tx,
        });
        Self { backends, shared }
    }

    /// Receive [`SessionEvent`]s published after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.shared.event_tx.subscribe()
    }

    // ── Operations ──────────────────────────────────────────────────

    /// Connect through the given backend.
    ///
    /// Requests account access, binds a signer to the first returned account
    /// and, when the provider publishes change notifications, attaches a
    /// listener for them. An existing connection is replaced.
    ///
    /// # Errors
    ///
    /// - `BackendMissing` if no backend of that kind is registered.
    /// - `ConnectFailure` if the user rejects the prompt, the wallet returns
    ///   no accounts or the backend fails.
    pub async fn connect(&self, backend: BackendKind) -> Result<WalletConnection> {
        let _loading = LoadingGuard::enter(&self.shared.in_flight);
        self.shared.state.lock().await.last_error = None;

        match self.open(backend).await {
            Ok(connection) => {
                info!(
                    backend = %backend,
                    address = %connection.active_account(),
                    "wallet connected"
                );
                self.shared.emit(SessionEvent::Connected {
                    backend,
                    address: connection.active_account().to_string(),
                });
                Ok(connection)
            }
            Err(err) => {
                let mut state = self.shared.state.lock().await;
                Err(self.shared.fail(&mut state, err))
            }
        }
    }

    async fn open(&self, backend: BackendKind) -> Result<WalletConnection> {
        let provider = self.backends.resolve(backend)?;
        let connect_failure = |e: BackendError| {
            let message = e.to_string();
            if message.is_empty() {
                SessionError::connect_failure(backend.connect_failure_message())
            } else {
                SessionError::connect_failure(message)
            }
        };

        debug!(backend = %backend, "requesting wallet accounts");
        let accounts = provider.request_accounts().await.map_err(connect_failure)?;
        let first = accounts
            .first()
            .ok_or_else(|| connect_failure(BackendError::NoAccounts))?;
        let signer = provider.signer(first).await.map_err(connect_failure)?;

        let connection = WalletConnection {
            backend,
            accounts: vec![signer.address().to_string()],
            provider: Arc::clone(&provider),
            signer,
        };

        let mut state = self.shared.state.lock().await;
        if state.connection.is_some() {
            debug!("replacing existing wallet connection");
        }
        self.shared.clear(&mut state);
        state.connection = Some(connection.clone());

        if let Some(events) = provider.subscribe() {
            let handle = tokio::spawn(provider_listener(
                Arc::downgrade(&self.shared),
                events,
                state.generation,
            ));
            self.shared.attach_listener(handle);
        }

        Ok(connection)
    }

    /// Sign `message` with the active account.
    ///
    /// The signature is remembered as the session's last signature.
    /// Connection state is never changed.
    ///
    /// # Errors
    ///
    /// Returns `SignFailure` if the wallet is not connected or the signer
    /// rejects the request.
    pub async fn sign(&self, message: &str) -> Result<String> {
        let _loading = LoadingGuard::enter(&self.shared.in_flight);

        let (signer, generation) = {
            let mut state = self.shared.state.lock().await;
            state.last_error = None;
            match state.connection.as_ref() {
                Some(connection) => (Arc::clone(&connection.signer), state.generation),
                None => {
                    return Err(self
                        .shared
                        .fail(&mut state, SessionError::sign_failure(NOT_CONNECTED)))
                }
            }
        };

        let signed = signer.sign_message(message.as_bytes()).await;

        let mut state = self.shared.state.lock().await;
        match signed {
            Ok(signature) => {
                debug!(address = %signer.address(), "message signed");
                if state.generation == generation {
                    state.last_signature = Some(signature.clone());
                }
                Ok(signature)
            }
            Err(e) => Err(self
                .shared
                .fail(&mut state, SessionError::sign_failure(e.to_string()))),
        }
    }

    /// Clear the connection. Idempotent and infallible.
    pub async fn disconnect(&self) {
        let mut state = self.shared.state.lock().await;
        if self.shared.clear(&mut state).is_some() {
            info!("wallet disconnected");
            self.shared.emit(SessionEvent::Disconnected { reason: None });
        }
    }

    // ── State accessors ─────────────────────────────────────────────

    /// Returns `true` while at least one operation is in flight.
    ///
    /// Advisory only: it does not prevent overlapping calls.
    pub fn is_loading(&self) -> bool {
        self.shared.in_flight.load(Ordering::Acquire) > 0
    }

    pub async fn is_connected(&self) -> bool {
        self.shared.state.lock().await.connection.is_some()
    }

    /// A snapshot of the current connection.
    pub async fn connection(&self) -> Option<WalletConnection> {
        self.shared.state.lock().await.connection.clone()
    }

    /// Exposed accounts, active first. Empty when disconnected.
    pub async fn accounts(&self) -> Vec<String> {
        self.shared
            .state
            .lock()
            .await
            .connection
            .as_ref()
            .map(|c| c.accounts.clone())
            .unwrap_or_default()
    }

    pub async fn active_account(&self) -> Option<String> {
        self.shared
            .state
            .lock()
            .await
            .connection
            .as_ref()
            .map(|c| c.active_account().to_string())
    }

    pub async fn backend(&self) -> Option<BackendKind> {
        self.shared
            .state
            .lock()
            .await
            .connection
            .as_ref()
            .map(WalletConnection::backend)
    }

    pub async fn last_error(&self) -> Option<SessionError> {
        self.shared.state.lock().await.last_error.clone()
    }

    pub async fn last_signature(&self) -> Option<String> {
        self.shared.state.lock().await.last_signature.clone()
    }
}

impl fmt::Debug for WalletSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalletSession")
            .field("backends", &self.backends)
            .field("loading", &self.is_loading())
            .finish_non_exhaustive()
    }
}

impl Drop for WalletSession {
    fn drop(&mut self) {
        self.shared.detach_listener();
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
    use crate::backends::{LocalSdkFactory, LocalWalletProvider};
    use crate::eip191;
    use crate::error::SessionErrorKind;
    use std::time::Duration;

    fn metamask_session() -> (WalletSession, Arc<LocalWalletProvider>) {
        let provider = Arc::new(LocalWalletProvider::random(2));
        let backends = WalletBackends::new().with_injected(provider.clone());
        (
            WalletSession::new(backends, SessionConfig::default()),
            provider,
        )
    }

    /// Wait for the next event matching `pred`, failing after a short timeout.
    async fn next_matching(
        rx: &mut broadcast::Receiver<SessionEvent>,
        pred: impl Fn(&SessionEvent) -> bool,
    ) -> SessionEvent {
        tokio::time::timeout(Duration::from_secs(2), async {
            loop {
                let event = rx.recv().await.unwrap();
                if pred(&event) {
                    return event;
                }
            }
        })
        .await
        .expect("timed out waiting for session event")
    }

    #[tokio::test]
    async fn connect_sets_single_active_account() {
        let (session, provider) = metamask_session();
        let connection = session.connect(BackendKind::MetaMask).await.unwrap();

        let first = provider.accounts().await.remove(0);
        assert_eq!(connection.accounts(), &[first.clone()]);
        assert_eq!(connection.active_account(), first);
        assert_eq!(connection.backend(), BackendKind::MetaMask);
        assert!(session.is_connected().await);
        assert_eq!(session.active_account().await, Some(first));
        assert_eq!(session.backend().await, Some(BackendKind::MetaMask));
        assert!(!session.is_loading());
    }

    #[tokio::test]
    async fn connect_without_injected_provider_is_backend_missing() {
        let session = WalletSession::new(WalletBackends::new(), SessionConfig::default());
        let err = session.connect(BackendKind::MetaMask).await.unwrap_err();

        assert_eq!(err.kind, SessionErrorKind::BackendMissing);
        assert_eq!(session.last_error().await, Some(err));
        assert!(!session.is_connected().await);
        assert!(!session.is_loading());
    }

    #[tokio::test]
    async fn rejected_connect_is_connect_failure() {
        let (session, provider) = metamask_session();
        provider.set_rejecting(true);

        let err = session.connect(BackendKind::MetaMask).await.unwrap_err();
        assert_eq!(err.kind, SessionErrorKind::ConnectFailure);
        assert!(session.accounts().await.is_empty());
        assert!(!session.is_loading());
    }

    #[tokio::test]
    async fn wallet_without_accounts_is_connect_failure() {
        let provider = Arc::new(LocalWalletProvider::new(vec![]));
        let session = WalletSession::new(
            WalletBackends::new().with_injected(provider),
            SessionConfig::default(),
        );
        let err = session.connect(BackendKind::MetaMask).await.unwrap_err();
        assert_eq!(err.kind, SessionErrorKind::ConnectFailure);
        assert!(!session.is_connected().await);
    }

    #[tokio::test]
    async fn coinbase_connect_uses_sdk_config() {
        let provider = Arc::new(LocalWalletProvider::random(1).without_notifications());
        let factory = Arc::new(LocalSdkFactory::new(provider));
        let session = WalletSession::new(
            WalletBackends::new().with_coinbase_sdk(factory.clone()),
            SessionConfig::default(),
        );

        let connection = session.connect(BackendKind::Coinbase).await.unwrap();
        assert_eq!(connection.backend(), BackendKind::Coinbase);
        assert_eq!(factory.requested_configs()[0].app_name, "Poker Game");
    }

    #[tokio::test]
    async fn sign_requires_connection() {
        let (session, _provider) = metamask_session();
        let err = session.sign("hello").await.unwrap_err();
        assert_eq!(err.kind, SessionErrorKind::SignFailure);
        assert_eq!(err.message, NOT_CONNECTED);
        assert!(session.last_signature().await.is_none());
    }

    #[tokio::test]
    async fn sign_records_recoverable_signature() {
        let (session, _provider) = metamask_session();
        let connection = session.connect(BackendKind::MetaMask).await.unwrap();

        let signature = session.sign("Connected successfully").await.unwrap();
        assert_eq!(session.last_signature().await.as_deref(), Some(&*signature));
        assert!(session.is_connected().await);

        let recovered = eip191::recover_address(b"Connected successfully", &signature).unwrap();
        assert_eq!(recovered, connection.active_account());
    }

    #[tokio::test]
    async fn rejected_signature_keeps_connection() {
        let (session, provider) = metamask_session();
        session.connect(BackendKind::MetaMask).await.unwrap();
        provider.set_rejecting(true);

        let err = session.sign("hello").await.unwrap_err();
        assert_eq!(err.kind, SessionErrorKind::SignFailure);
        assert!(session.is_connected().await);
    }

    #[tokio::test]
    async fn new_operation_clears_previous_error() {
        let (session, _provider) = metamask_session();
        session.sign("too early").await.unwrap_err();
        assert!(session.last_error().await.is_some());

        session.connect(BackendKind::MetaMask).await.unwrap();
        assert!(session.last_error().await.is_none());
    }

    #[tokio::test]
    async fn disconnect_is_idempotent() {
        let (session, _provider) = metamask_session();
        session.connect(BackendKind::MetaMask).await.unwrap();
        session.sign("hello").await.unwrap();

        session.disconnect().await;
        let once = (
            session.is_connected().await,
            session.accounts().await,
            session.last_signature().await,
            session.backend().await,
        );
        session.disconnect().await;
        let twice = (
            session.is_connected().await,
            session.accounts().await,
            session.last_signature().await,
            session.backend().await,
        );

        assert_eq!(once, (false, vec![], None, None));
        assert_eq!(once, twice);
    }

    #[tokio::test]
    async fn disconnect_emits_once() {
        let (session, _provider) = metamask_session();
        let mut events = session.subscribe();
        session.connect(BackendKind::MetaMask).await.unwrap();
        session.disconnect().await;
        session.disconnect().await;

        assert!(matches!(
            events.recv().await.unwrap(),
            SessionEvent::Connected { .. }
        ));
        assert_eq!(
            events.recv().await.unwrap(),
            SessionEvent::Disconnected { reason: None }
        );
        assert!(events.try_recv().is_err());
    }

    #[tokio::test]
    async fn empty_account_list_disconnects() {
        let (session, provider) = metamask_session();
        let mut events = session.subscribe();
        session.connect(BackendKind::MetaMask).await.unwrap();

        provider.revoke_access();
        next_matching(&mut events, |e| {
            matches!(e, SessionEvent::Disconnected { .. })
        })
        .await;

        assert!(!session.is_connected().await);
        assert!(session.accounts().await.is_empty());
    }

    #[tokio::test]
    async fn account_switch_rebinds_signer() {
        let (session, provider) = metamask_session();
        let mut events = session.subscribe();
        session.connect(BackendKind::MetaMask).await.unwrap();

        let second = provider.accounts().await.remove(1);
        provider.switch_account(&second).await.unwrap();
        next_matching(&mut events, |e| {
            matches!(e, SessionEvent::AccountsChanged { .. })
        })
        .await;

        assert_eq!(session.active_account().await, Some(second.clone()));
        assert_eq!(session.accounts().await.len(), 2);
        let signature = session.sign("switched").await.unwrap();
        assert_eq!(
            eip191::recover_address(b"switched", &signature).unwrap(),
            second
        );
    }

    #[tokio::test]
    async fn chain_change_clears_session() {
        let (session, provider) = metamask_session();
        let mut events = session.subscribe();
        session.connect(BackendKind::MetaMask).await.unwrap();

        provider.switch_chain("0x89");
        let event = next_matching(&mut events, |e| {
            matches!(e, SessionEvent::ChainChanged { .. })
        })
        .await;

        assert_eq!(
            event,
            SessionEvent::ChainChanged {
                chain_id: "0x89".into()
            }
        );
        assert!(!session.is_connected().await);
    }

    #[tokio::test]
    async fn listener_is_detached_after_disconnect() {
        let (session, provider) = metamask_session();
        let mut events = session.subscribe();
        session.connect(BackendKind::MetaMask).await.unwrap();
        session.disconnect().await;

        provider.switch_chain("0x1");
        tokio::time::sleep(Duration::from_millis(50)).await;

        let mut saw_chain_change = false;
        while let Ok(event) = events.try_recv() {
            saw_chain_change |= matches!(event, SessionEvent::ChainChanged { .. });
        }
        assert!(!saw_chain_change);
    }

    #[tokio::test]
    async fn reconnect_replaces_listener() {
        let (session, provider) = metamask_session();
        let mut events = session.subscribe();
        session.connect(BackendKind::MetaMask).await.unwrap();
        session.connect(BackendKind::MetaMask).await.unwrap();

        provider.switch_chain("0x5");
        next_matching(&mut events, |e| {
            matches!(e, SessionEvent::ChainChanged { .. })
        })
        .await;
        tokio::time::sleep(Duration::from_millis(50)).await;

        let mut duplicates = 0;
        while let Ok(event) = events.try_recv() {
            if matches!(event, SessionEvent::ChainChanged { .. }) {
                duplicates += 1;
            }
        }
        assert_eq!(duplicates, 0);
    }
}
