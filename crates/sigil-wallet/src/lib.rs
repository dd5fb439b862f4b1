//! # sigil-wallet — encrypted local wallet store and lifecycle manager.
//!
//! Creates, imports, stores, exports and deletes Ed25519 signing keys,
//! each sealed under its own password, and resolves which stored wallet
//! an operation should use.
//!
//! # Modules
//!
//! - [`error`] — `WalletError` enum
//! - [`mnemonic`] — BIP-39 phrase generation and validation
//! - [`encryption`] — Argon2id key derivation and AES-256-GCM sealing
//! - [`keys`] — wallet secrets, seed-to-signer derivation
//! - [`record`] — on-disk record format and name rules
//! - [`store`] — one-file-per-wallet record store
//! - [`keystore`] — portable password-protected key blobs
//! - [`config`] — data directory and active wallet pointer storage
//! - [`resolver`] — active wallet resolution
//! - [`manager`] — high-level wallet lifecycle

pub mod config;
pub mod encryption;
pub mod error;
pub mod keys;
pub mod keystore;
pub mod manager;
pub mod mnemonic;
pub mod record;
pub mod resolver;
pub mod store;

// Re-exports for convenient access
pub use config::{FileConfigStore, MemoryConfigStore, WalletConfig};
pub use encryption::KdfParams;
pub use error::WalletError;
pub use keys::{DecryptedKeyMaterial, WalletSecret};
pub use manager::{
    CreatedWallet, ExportFormat, ExportedSecret, ImportSecret, WalletManager, WalletSigner,
};
pub use record::{WalletKind, WalletRecord, WalletSummary};
pub use store::WalletStore;
