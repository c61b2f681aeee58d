//! In-process wallet backend backed by secp256k1 keys held in memory.
//!
//! [`LocalWalletProvider`] behaves like an injected browser wallet: it exposes
//! its accounts (active first), hands out [`LocalKeySigner`]s and publishes
//! [`ProviderEvent`]s when accounts or chains are switched. It can also reject
//! prompts on demand to exercise failure paths.
//!
//! # Example
//!
//! ```
//! # async fn example() -> Result<(), wallet_lobby_client::error::BackendError> {
//! use wallet_lobby_client::backend::WalletProvider;
//! use wallet_lobby_client::backends::LocalWalletProvider;
//!
//! let provider = LocalWalletProvider::random(2);
//! let accounts = provider.request_accounts().await?;
//! assert_eq!(accounts.len(), 2);
//!
//! let signer = provider.signer(&accounts[0]).await?;
//! let signature = signer.sign_message(b"hello").await?;
//! assert!(signature.starts_with("0x"));
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex as StdMutex};

use async_trait::async_trait;
use k256::ecdsa::SigningKey;
use tokio::sync::{broadcast, Mutex};
use tracing::debug;

use crate::address::addresses_match;
use crate::backend::{ProviderEvent, SdkConfig, SdkProviderFactory, Signer, WalletProvider};
use crate::eip191;
use crate::error::BackendError;

/// Capacity of the provider's change-notification channel.
const EVENT_CHANNEL_CAPACITY: usize = 16;

// ── Signer ──────────────────────────────────────────────────────────

/// A [`Signer`] holding a secp256k1 private key.
pub struct LocalKeySigner {
    key: SigningKey,
    address: String,
}

impl LocalKeySigner {
    pub fn new(key: SigningKey) -> Self {
        let address = eip191::address_from_signing_key(&key);
        Self { key, address }
    }

    /// Generate a fresh key from the operating system RNG.
    pub fn random() -> Self {
        Self::new(SigningKey::random(&mut rand::rngs::OsRng))
    }

    /// Load a key from 32 hex-encoded bytes, with or without a `0x` prefix.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::InvalidKey`] if the input is not a valid
    /// secp256k1 scalar.
    pub fn from_hex(private_key: &str) -> Result<Self, BackendError> {
        let digits = private_key.strip_prefix("0x").unwrap_or(private_key);
        let bytes = hex::decode(digits).map_err(|e| BackendError::InvalidKey(e.to_string()))?;
        let key =
            SigningKey::from_slice(&bytes).map_err(|e| BackendError::InvalidKey(e.to_string()))?;
        Ok(Self::new(key))
    }
}

impl fmt::Debug for LocalKeySigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalKeySigner")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Signer for LocalKeySigner {
    fn address(&self) -> &str {
        &self.address
    }

    async fn sign_message(&self, message: &[u8]) -> Result<String, BackendError> {
        eip191::sign_message(&self.key, message)
    }
}

/// Wraps a shared signer so the provider can keep its own handle while
/// refusing to sign when the user is rejecting prompts.
struct GatedSigner {
    inner: Arc<LocalKeySigner>,
    rejecting: Arc<AtomicBool>,
}

#[async_trait]
impl Signer for GatedSigner {
    fn address(&self) -> &str {
        self.inner.address()
    }

    async fn sign_message(&self, message: &[u8]) -> Result<String, BackendError> {
        if self.rejecting.load(Ordering::Acquire) {
            return Err(BackendError::UserRejected("User denied message signature.".into()));
        }
        self.inner.sign_message(message).await
    }
}

// ── Provider ────────────────────────────────────────────────────────

/// An in-memory [`WalletProvider`].
pub struct LocalWalletProvider {
    /// Exposed accounts, active first.
    signers: Mutex<Vec<Arc<LocalKeySigner>>>,
    /// `None` when change notifications are disabled.
    events: Option<broadcast::Sender<ProviderEvent>>,
    /// When set, prompts are rejected as if the user dismissed them.
    rejecting: Arc<AtomicBool>,
}

impl LocalWalletProvider {
    /// Create a provider exposing `signers` in order, with change
    /// notifications enabled.
    pub fn new(signers: Vec<LocalKeySigner>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            signers: Mutex::new(signers.into_iter().map(Arc::new).collect()),
            events: Some(events),
            rejecting: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Create a provider with `count` freshly generated keys.
    pub fn random(count: usize) -> Self {
        Self::new((0..count).map(|_| LocalKeySigner::random()).collect())
    }

    /// Disable change notifications, matching SDK-hosted wallets that do not
    /// publish them.
    #[must_use]
    pub fn without_notifications(mut self) -> Self {
        self.events = None;
        self
    }

    /// Make subsequent prompts fail with [`BackendError::UserRejected`].
    pub fn set_rejecting(&self, rejecting: bool) {
        self.rejecting.store(rejecting, Ordering::Release);
    }

    /// Addresses currently exposed, active first.
    pub async fn accounts(&self) -> Vec<String> {
        self.signers
            .lock()
            .await
            .iter()
            .map(|s| s.address().to_string())
            .collect()
    }

    /// Make `address` the active account and announce the new ordering.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::UnknownAccount`] if `address` is not held.
    pub async fn switch_account(&self, address: &str) -> Result<(), BackendError> {
        let accounts = {
            let mut signers = self.signers.lock().await;
            let index = signers
                .iter()
                .position(|s| addresses_match(s.address(), address))
                .ok_or_else(|| BackendError::UnknownAccount(address.to_string()))?;
            let signer = signers.remove(index);
            signers.insert(0, signer);
            signers
                .iter()
                .map(|s| s.address().to_string())
                .collect::<Vec<_>>()
        };
        self.notify(ProviderEvent::AccountsChanged(accounts));
        Ok(())
    }

    /// Announce that the site lost access to every account.
    pub fn revoke_access(&self) {
        self.notify(ProviderEvent::AccountsChanged(Vec::new()));
    }

    /// Announce a network switch.
    pub fn switch_chain(&self, chain_id: impl Into<String>) {
        self.notify(ProviderEvent::ChainChanged(chain_id.into()));
    }

    fn notify(&self, event: ProviderEvent) {
        let Some(events) = &self.events else {
            debug!("provider notifications disabled, dropping {event:?}");
            return;
        };
        if events.send(event).is_err() {
            debug!("no provider listeners attached");
        }
    }
}

impl fmt::Debug for LocalWalletProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalWalletProvider")
            .field("notifications", &self.events.is_some())
            .field("rejecting", &self.rejecting.load(Ordering::Acquire))
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl WalletProvider for LocalWalletProvider {
    async fn request_accounts(&self) -> Result<Vec<String>, BackendError> {
        if self.rejecting.load(Ordering::Acquire) {
            return Err(BackendError::UserRejected("User rejected the request.".into()));
        }
        Ok(self.accounts().await)
    }

    async fn signer(&self, account: &str) -> Result<Arc<dyn Signer>, BackendError> {
        let signers = self.signers.lock().await;
        let inner = signers
            .iter()
            .find(|s| addresses_match(s.address(), account))
            .cloned()
            .ok_or_else(|| BackendError::UnknownAccount(account.to_string()))?;
        Ok(Arc::new(GatedSigner {
            inner,
            rejecting: Arc::clone(&self.rejecting),
        }))
    }

    fn subscribe(&self) -> Option<broadcast::Receiver<ProviderEvent>> {
        self.events.as_ref().map(broadcast::Sender::subscribe)
    }
}

// ── SDK factory ─────────────────────────────────────────────────────

/// An [`SdkProviderFactory`] that always hands out the same local provider
/// and records the options it was asked to build with.
pub struct LocalSdkFactory {
    provider: Arc<LocalWalletProvider>,
    requested: StdMutex<Vec<SdkConfig>>,
}

impl LocalSdkFactory {
    pub fn new(provider: Arc<LocalWalletProvider>) -> Self {
        Self {
            provider,
            requested: StdMutex::new(Vec::new()),
        }
    }

    /// Options seen by [`make_provider`](SdkProviderFactory::make_provider), oldest first.
    pub fn requested_configs(&self) -> Vec<SdkConfig> {
        self.requested
            .lock()
            .map(|configs| configs.clone())
            .unwrap_or_default()
    }
}

impl fmt::Debug for LocalSdkFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalSdkFactory")
            .field("provider", &self.provider)
            .finish_non_exhaustive()
    }
}

impl SdkProviderFactory for LocalSdkFactory {
    fn make_provider(&self, config: &SdkConfig) -> Result<Arc<dyn WalletProvider>, BackendError> {
        debug!(app_name = %config.app_name, "building local SDK provider");
        if let Ok(mut requested) = self.requested.lock() {
            requested.push(config.clone());
        }
        let provider: Arc<dyn WalletProvider> = self.provider.clone();
        Ok(provider)
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::indexing_slicing
)]
mod tests {
    use super::*;

    const KNOWN_KEY: &str = "0x4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318";

    #[test]
    fn from_hex_derives_address() {
        let signer = LocalKeySigner::from_hex(KNOWN_KEY).unwrap();
        assert_eq!(
            signer.address(),
            "0x2c7536E3605D9C16a7a3D7b1898e529396a65c23"
        );
    }

    #[test]
    fn from_hex_rejects_garbage() {
        assert!(matches!(
            LocalKeySigner::from_hex("0xnothex"),
            Err(BackendError::InvalidKey(_))
        ));
        assert!(LocalKeySigner::from_hex("00").is_err());
    }

    #[test]
    fn debug_does_not_print_key() {
        let signer = LocalKeySigner::from_hex(KNOWN_KEY).unwrap();
        let debug = format!("{signer:?}");
        assert!(!debug.contains("4c0883a6"));
    }

    #[tokio::test]
    async fn signatures_recover_to_signer() {
        let provider = LocalWalletProvider::random(1);
        let accounts = provider.request_accounts().await.unwrap();
        let signer = provider.signer(&accounts[0]).await.unwrap();
        let signature = signer.sign_message(b"Connected successfully").await.unwrap();
        let recovered = eip191::recover_address(b"Connected successfully", &signature).unwrap();
        assert_eq!(recovered, accounts[0]);
    }

    #[tokio::test]
    async fn rejecting_provider_fails_prompts() {
        let provider = LocalWalletProvider::random(1);
        let account = provider.accounts().await.remove(0);
        let signer = provider.signer(&account).await.unwrap();

        provider.set_rejecting(true);
        assert!(matches!(
            provider.request_accounts().await,
            Err(BackendError::UserRejected(_))
        ));
        assert!(matches!(
            signer.sign_message(b"x").await,
            Err(BackendError::UserRejected(_))
        ));
    }

    #[tokio::test]
    async fn signer_lookup_is_case_insensitive() {
        let provider = LocalWalletProvider::random(1);
        let account = provider.accounts().await.remove(0);
        let signer = provider
            .signer(&account.to_ascii_lowercase())
            .await
            .unwrap();
        assert_eq!(signer.address(), account);
        assert!(matches!(
            provider.signer("0x0000000000000000000000000000000000000000").await,
            Err(BackendError::UnknownAccount(_))
        ));
    }

    #[tokio::test]
    async fn switch_account_reorders_and_notifies() {
        let provider = LocalWalletProvider::random(2);
        let mut events = provider.subscribe().unwrap();
        let before = provider.accounts().await;

        provider.switch_account(&before[1]).await.unwrap();

        let after = provider.accounts().await;
        assert_eq!(after[0], before[1]);
        assert_eq!(after[1], before[0]);
        assert_eq!(
            events.recv().await.unwrap(),
            ProviderEvent::AccountsChanged(after)
        );
    }

    #[tokio::test]
    async fn revoke_and_chain_switch_are_published() {
        let provider = LocalWalletProvider::random(1);
        let mut events = provider.subscribe().unwrap();

        provider.revoke_access();
        provider.switch_chain("0x89");

        assert_eq!(
            events.recv().await.unwrap(),
            ProviderEvent::AccountsChanged(vec![])
        );
        assert_eq!(
            events.recv().await.unwrap(),
            ProviderEvent::ChainChanged("0x89".into())
        );
    }

    #[test]
    fn without_notifications_has_no_subscription() {
        let provider = LocalWalletProvider::random(1).without_notifications();
        assert!(provider.subscribe().is_none());
    }

    #[test]
    fn sdk_factory_records_config() {
        let factory = LocalSdkFactory::new(Arc::new(LocalWalletProvider::random(1)));
        factory
            .make_provider(&SdkConfig::default().with_dark_mode(true))
            .unwrap();
        let configs = factory.requested_configs();
        assert_eq!(configs.len(), 1);
        assert!(configs[0].dark_mode);
    }
}
