//! Concrete wallet backends.
//!
//! | Backend                 | Shape                                   |
//! |-------------------------|-----------------------------------------|
//! | [`LocalWalletProvider`] | In-process secp256k1 keys; usable both as an injected provider and, through [`LocalSdkFactory`], as an SDK-hosted one |
//!
//! Browser-hosted wallets implement [`WalletProvider`](crate::backend::WalletProvider)
//! in the embedding application.

pub mod local;

pub use local::{LocalKeySigner, LocalSdkFactory, LocalWalletProvider};
