#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::indexing_slicing,
    dead_code
)]
//! Shared test utilities for Wallet Lobby Client integration tests.
//!
//! Provides a recording [`MockTransport`], session builders over
//! [`LocalWalletProvider`] and a helper for draining flow events.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex as StdMutex};

use async_trait::async_trait;
use tokio::sync::mpsc;
use wallet_lobby_client::backends::{LocalSdkFactory, LocalWalletProvider};
use wallet_lobby_client::protocol::ClientEvent;
use wallet_lobby_client::{
    FlowEvent, SessionConfig, Transport, TransportError, WalletBackends, WalletSession,
};

/// Socket id reported by [`MockTransport`] unless overridden.
pub const MOCK_SOCKET_ID: &str = "sock-1";

// ── MockTransport ───────────────────────────────────────────────────

/// A recording mock transport for integration testing.
///
/// Every event the flow emits is recorded in `emitted`. Readiness and the
/// socket id can be changed while the flow holds the transport.
pub struct MockTransport {
    /// Whether the transport reports itself connected.
    pub connected: AtomicBool,
    /// Recorded outgoing events.
    pub emitted: StdMutex<Vec<ClientEvent>>,
    /// Socket id, `None` until assigned.
    pub socket_id: StdMutex<Option<String>>,
    /// Number of upcoming emits that fail with `TransportError::Send`.
    pub failing_emits: AtomicUsize,
}

impl MockTransport {
    /// A connected transport with [`MOCK_SOCKET_ID`].
    pub fn connected() -> Arc<Self> {
        Arc::new(Self {
            connected: AtomicBool::new(true),
            emitted: StdMutex::new(Vec::new()),
            socket_id: StdMutex::new(Some(MOCK_SOCKET_ID.to_string())),
            failing_emits: AtomicUsize::new(0),
        })
    }

    /// A transport that has not connected yet.
    pub fn disconnected() -> Arc<Self> {
        let transport = Self::connected();
        transport.set_connected(false);
        transport
    }

    pub fn set_connected(&self, connected: bool) {
        self.connected.store(connected, Ordering::Release);
    }

    pub fn set_socket_id(&self, socket_id: Option<&str>) {
        *self.socket_id.lock().unwrap() = socket_id.map(str::to_string);
    }

    /// Make the next `count` emits fail.
    pub fn fail_next_emits(&self, count: usize) {
        self.failing_emits.store(count, Ordering::Release);
    }

    pub fn emitted(&self) -> Vec<ClientEvent> {
        self.emitted.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for MockTransport {
    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    fn socket_id(&self) -> Option<String> {
        self.socket_id.lock().unwrap().clone()
    }

    async fn emit(&self, event: ClientEvent) -> Result<(), TransportError> {
        let failing = self
            .failing_emits
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(TransportError::Send("scripted failure".into()));
        }
        if !self.is_connected() {
            return Err(TransportError::Closed);
        }
        self.emitted.lock().unwrap().push(event);
        Ok(())
    }
}

// ── Session builders ────────────────────────────────────────────────

/// A session whose injected backend is `provider`.
pub fn injected_session(provider: &Arc<LocalWalletProvider>) -> Arc<WalletSession> {
    let backends = WalletBackends::new().with_injected(provider.clone());
    Arc::new(WalletSession::new(backends, SessionConfig::default()))
}

/// A session whose Coinbase SDK backend builds `provider`.
pub fn sdk_session(
    provider: &Arc<LocalWalletProvider>,
) -> (Arc<WalletSession>, Arc<LocalSdkFactory>) {
    let factory = Arc::new(LocalSdkFactory::new(provider.clone()));
    let backends = WalletBackends::new().with_coinbase_sdk(factory.clone());
    (
        Arc::new(WalletSession::new(backends, SessionConfig::default())),
        factory,
    )
}

/// A provider with `count` random accounts, plus its active address.
pub async fn local_wallet(count: usize) -> (Arc<LocalWalletProvider>, String) {
    let provider = Arc::new(LocalWalletProvider::random(count));
    let address = provider.accounts().await.remove(0);
    (provider, address)
}

// ── Event helpers ───────────────────────────────────────────────────

/// Collect every flow event currently queued.
pub fn drain_events(rx: &mut mpsc::Receiver<FlowEvent>) -> Vec<FlowEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}
