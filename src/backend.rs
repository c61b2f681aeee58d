//! Wallet backend abstraction.
//!
//! Two backend shapes are supported, selected by [`BackendKind`]:
//!
//! - **Injected provider** (MetaMask-style): a single provider object that
//!   already exists in the host environment. It may publish account and chain
//!   changes through [`WalletProvider::subscribe`].
//! - **SDK-hosted provider** (Coinbase Wallet SDK): built on demand through an
//!   [`SdkProviderFactory`] from an [`SdkConfig`]. Change notifications are
//!   optional.
//!
//! Both resolve to an `Arc<dyn WalletProvider>`, so [`WalletSession`] drives
//! them through the same code path once resolved.
//!
//! # Implementing a Backend
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use async_trait::async_trait;
//! use wallet_lobby_client::backend::{Signer, WalletProvider};
//! use wallet_lobby_client::error::BackendError;
//!
//! struct MyProvider;
//!
//! #[async_trait]
//! impl WalletProvider for MyProvider {
//!     async fn request_accounts(&self) -> Result<Vec<String>, BackendError> {
//!         // Prompt the user, return the selected accounts (first = active)
//!         Ok(vec![])
//!     }
//!
//!     async fn signer(&self, account: &str) -> Result<Arc<dyn Signer>, BackendError> {
//!         Err(BackendError::UnknownAccount(account.to_string()))
//!     }
//! }
//! ```
//!
//! [`WalletSession`]: crate::session::WalletSession

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::error::{BackendError, SessionError};

/// Message reported when no injected provider is registered.
pub const METAMASK_MISSING: &str = "MetaMask not installed. Please install MetaMask extension first.";

/// Message reported when no Coinbase Wallet SDK factory is registered.
pub const COINBASE_MISSING: &str = "Coinbase Wallet SDK not available.";

/// Which wallet backend a connection goes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Injected browser-extension provider.
    MetaMask,
    /// Coinbase Wallet SDK-hosted provider.
    Coinbase,
}

impl BackendKind {
    /// Human-readable wallet name.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::MetaMask => "MetaMask",
            Self::Coinbase => "Coinbase Wallet",
        }
    }

    /// Fallback message used when a connect attempt fails without detail.
    pub fn connect_failure_message(&self) -> &'static str {
        match self {
            Self::MetaMask => "Failed to connect MetaMask",
            Self::Coinbase => "Failed to connect Coinbase Wallet",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Change notification published by a provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderEvent {
    /// The set of exposed accounts changed. Empty means the wallet was
    /// locked or the site was disconnected.
    AccountsChanged(Vec<String>),
    /// The wallet switched networks. Carries the new chain id (hex string).
    ChainChanged(String),
}

/// A capability able to sign messages with one account's key.
#[async_trait]
pub trait Signer: Send + Sync + 'static {
    /// Address of the account this signer is bound to.
    fn address(&self) -> &str;

    /// Sign `message` as an Ethereum personal message.
    ///
    /// Returns the `0x`-prefixed hex encoded signature.
    ///
    /// # Errors
    ///
    /// Returns a [`BackendError`] if the user rejects the request or the
    /// wallet fails to sign.
    async fn sign_message(&self, message: &[u8]) -> Result<String, BackendError>;
}

/// A wallet provider: account access plus signer lookup.
#[async_trait]
pub trait WalletProvider: Send + Sync + 'static {
    /// Ask the wallet for account access.
    ///
    /// Returns the exposed accounts, active account first.
    ///
    /// # Errors
    ///
    /// Returns a [`BackendError`] if the user rejects the prompt or the
    /// provider fails.
    async fn request_accounts(&self) -> Result<Vec<String>, BackendError>;

    /// Obtain a signer bound to `account`.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::UnknownAccount`] if the provider does not
    /// manage `account`, or any other provider failure.
    async fn signer(&self, account: &str) -> Result<Arc<dyn Signer>, BackendError>;

    /// Subscribe to account and chain change notifications.
    ///
    /// Providers without native change notification keep the default `None`.
    fn subscribe(&self) -> Option<broadcast::Receiver<ProviderEvent>> {
        None
    }
}

/// Options passed to an SDK-hosted wallet when building its provider.
///
/// # Example
///
/// ```
/// use wallet_lobby_client::backend::SdkConfig;
///
/// let config = SdkConfig::new("Poker Game").with_dark_mode(true);
/// assert_eq!(config.app_name, "Poker Game");
/// assert!(config.dark_mode);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SdkConfig {
    /// Application name shown in the wallet prompt.
    pub app_name: String,
    /// Logo shown in the wallet prompt. Empty for none.
    pub app_logo_url: String,
    /// Whether the wallet UI should use its dark theme.
    pub dark_mode: bool,
}

impl SdkConfig {
    pub fn new(app_name: impl Into<String>) -> Self {
        Self {
            app_name: app_name.into(),
            app_logo_url: String::new(),
            dark_mode: false,
        }
    }

    #[must_use]
    pub fn with_app_logo_url(mut self, url: impl Into<String>) -> Self {
        self.app_logo_url = url.into();
        self
    }

    #[must_use]
    pub fn with_dark_mode(mut self, dark_mode: bool) -> Self {
        self.dark_mode = dark_mode;
        self
    }
}

impl Default for SdkConfig {
    fn default() -> Self {
        Self::new("Poker Game")
    }
}

/// Builds SDK-hosted providers.
pub trait SdkProviderFactory: Send + Sync + 'static {
    /// Create a provider for the given SDK options.
    ///
    /// # Errors
    ///
    /// Returns a [`BackendError`] if the SDK cannot be initialized.
    fn make_provider(&self, config: &SdkConfig) -> Result<Arc<dyn WalletProvider>, BackendError>;
}

/// The wallet backends available to a session, keyed by [`BackendKind`].
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use wallet_lobby_client::backend::{BackendKind, WalletBackends};
/// use wallet_lobby_client::backends::LocalWalletProvider;
///
/// let backends = WalletBackends::new()
///     .with_injected(Arc::new(LocalWalletProvider::random(1)));
/// assert!(backends.has(BackendKind::MetaMask));
/// assert!(!backends.has(BackendKind::Coinbase));
/// ```
#[derive(Clone, Default)]
pub struct WalletBackends {
    injected: Option<Arc<dyn WalletProvider>>,
    coinbase_sdk: Option<Arc<dyn SdkProviderFactory>>,
    sdk_config: SdkConfig,
}

impl WalletBackends {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the injected provider used for [`BackendKind::MetaMask`].
    #[must_use]
    pub fn with_injected(mut self, provider: Arc<dyn WalletProvider>) -> Self {
        self.injected = Some(provider);
        self
    }

    /// Register the SDK factory used for [`BackendKind::Coinbase`].
    #[must_use]
    pub fn with_coinbase_sdk(mut self, factory: Arc<dyn SdkProviderFactory>) -> Self {
        self.coinbase_sdk = Some(factory);
        self
    }

    /// Override the options handed to the SDK factory.
    #[must_use]
    pub fn with_sdk_config(mut self, config: SdkConfig) -> Self {
        self.sdk_config = config;
        self
    }

    /// Returns `true` if a backend of the given kind is registered.
    pub fn has(&self, kind: BackendKind) -> bool {
        match kind {
            BackendKind::MetaMask => self.injected.is_some(),
            BackendKind::Coinbase => self.coinbase_sdk.is_some(),
        }
    }

    /// Resolve the provider for `kind`.
    ///
    /// # Errors
    ///
    /// Returns a `BackendMissing` [`SessionError`] if nothing is registered
    /// for `kind`, or a `ConnectFailure` if the SDK factory fails.
    pub fn resolve(&self, kind: BackendKind) -> Result<Arc<dyn WalletProvider>, SessionError> {
        match kind {
            BackendKind::MetaMask => self
                .injected
                .clone()
                .ok_or_else(|| SessionError::backend_missing(METAMASK_MISSING)),
            BackendKind::Coinbase => {
                let factory = self
                    .coinbase_sdk
                    .as_ref()
                    .ok_or_else(|| SessionError::backend_missing(COINBASE_MISSING))?;
                factory
                    .make_provider(&self.sdk_config)
                    .map_err(|e| SessionError::connect_failure(e.to_string()))
            }
        }
    }
}

impl fmt::Debug for WalletBackends {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalletBackends")
            .field("injected", &self.injected.is_some())
            .field("coinbase_sdk", &self.coinbase_sdk.is_some())
            .field("sdk_config", &self.sdk_config)
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::error::SessionErrorKind;

    struct FailingFactory;

    impl SdkProviderFactory for FailingFactory {
        fn make_provider(
            &self,
            _config: &SdkConfig,
        ) -> Result<Arc<dyn WalletProvider>, BackendError> {
            Err(BackendError::Provider("sdk init failed".into()))
        }
    }

    #[test]
    fn backend_kind_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&BackendKind::MetaMask).unwrap(),
            "\"metamask\""
        );
        assert_eq!(
            serde_json::to_string(&BackendKind::Coinbase).unwrap(),
            "\"coinbase\""
        );
    }

    #[test]
    fn default_sdk_config_names_the_app() {
        let config = SdkConfig::default();
        assert_eq!(config.app_name, "Poker Game");
        assert!(config.app_logo_url.is_empty());
        assert!(!config.dark_mode);
    }

    #[test]
    fn resolve_without_injected_is_backend_missing() {
        let err = WalletBackends::new()
            .resolve(BackendKind::MetaMask)
            .err()
            .unwrap();
        assert_eq!(err.kind, SessionErrorKind::BackendMissing);
        assert_eq!(err.message, METAMASK_MISSING);
    }

    #[test]
    fn resolve_without_sdk_is_backend_missing() {
        let err = WalletBackends::new()
            .resolve(BackendKind::Coinbase)
            .err()
            .unwrap();
        assert_eq!(err.kind, SessionErrorKind::BackendMissing);
    }

    #[test]
    fn failing_sdk_factory_is_connect_failure() {
        let backends = WalletBackends::new().with_coinbase_sdk(Arc::new(FailingFactory));
        let err = backends.resolve(BackendKind::Coinbase).err().unwrap();
        assert_eq!(err.kind, SessionErrorKind::ConnectFailure);
        assert_eq!(err.message, "sdk init failed");
    }
}
