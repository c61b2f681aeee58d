//! Error types for wallet sessions, wallet backends and lobby transports.

use std::fmt;

use thiserror::Error;

/// Category of a [`SessionError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionErrorKind {
    /// The user rejected the request or the backend threw while connecting.
    ConnectFailure,
    /// The wallet is not connected, or the signer rejected the request.
    SignFailure,
    /// The required wallet extension or SDK is not available.
    BackendMissing,
}

impl SessionErrorKind {
    /// Returns a human-readable description of this error kind.
    pub fn description(&self) -> &'static str {
        match self {
            Self::ConnectFailure => {
                "The wallet connection was rejected by the user or failed inside the wallet."
            }
            Self::SignFailure => "The message could not be signed with the connected wallet.",
            Self::BackendMissing => "The requested wallet is not installed or not available.",
        }
    }
}

impl fmt::Display for SessionErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ConnectFailure => "CONNECT_FAILURE",
            Self::SignFailure => "SIGN_FAILURE",
            Self::BackendMissing => "BACKEND_MISSING",
        };
        f.write_str(name)
    }
}

/// A recoverable failure reported by [`WalletSession`](crate::session::WalletSession).
///
/// Session errors are transient: the session clears its last error at the
/// start of every new operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct SessionError {
    /// Message suitable for display to the player.
    pub message: String,
    /// What went wrong.
    pub kind: SessionErrorKind,
}

impl SessionError {
    pub fn new(kind: SessionErrorKind, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind,
        }
    }

    pub fn connect_failure(message: impl Into<String>) -> Self {
        Self::new(SessionErrorKind::ConnectFailure, message)
    }

    pub fn sign_failure(message: impl Into<String>) -> Self {
        Self::new(SessionErrorKind::SignFailure, message)
    }

    pub fn backend_missing(message: impl Into<String>) -> Self {
        Self::new(SessionErrorKind::BackendMissing, message)
    }
}

/// Errors raised by a wallet backend (provider, SDK factory or signer).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    /// The user dismissed or rejected the wallet prompt.
    #[error("user rejected the request: {0}")]
    UserRejected(String),

    /// The backend returned no accounts.
    #[error("no accounts returned by wallet")]
    NoAccounts,

    /// The requested account is not managed by this backend.
    #[error("unknown account: {0}")]
    UnknownAccount(String),

    /// Key material could not be parsed.
    #[error("invalid key: {0}")]
    InvalidKey(String),

    /// A signature could not be produced or parsed.
    #[error("signature error: {0}")]
    Signature(String),

    /// Any other provider or SDK failure.
    #[error("{0}")]
    Provider(String),
}

/// Errors raised by a lobby [`Transport`](crate::transport::Transport).
#[derive(Debug, Error)]
pub enum TransportError {
    /// Failed to send a message through the transport.
    #[error("transport send error: {0}")]
    Send(String),

    /// Failed to receive a message from the transport.
    #[error("transport receive error: {0}")]
    Receive(String),

    /// The transport connection is closed.
    #[error("transport connection closed")]
    Closed,

    /// Failed to serialize or deserialize a wire frame.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A wire frame was well-formed JSON but not a known event.
    #[error("malformed frame: {0}")]
    MalformedFrame(String),

    /// An operation timed out.
    #[error("operation timed out")]
    Timeout,

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A specialized [`Result`] type for wallet session operations.
pub type Result<T> = std::result::Result<T, SessionError>;
