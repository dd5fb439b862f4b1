//! Wallet error types.

use sigil_core::error::{AddressError, ChainError, ConfigError, CryptoError};
use thiserror::Error;

use crate::record::WalletKind;

/// Errors that can occur in wallet operations.
///
/// Every variant is recoverable by the operator; none is retried
/// internally.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WalletError {
    /// No record is stored under this name.
    #[error("wallet not found: {0}")]
    WalletNotFound(String),

    /// A record with this name already exists.
    #[error("wallet already exists: {0}")]
    WalletAlreadyExists(String),

    /// Decryption failed its integrity check.
    #[error("invalid password")]
    InvalidPassword,

    /// Recovery phrase failed wordlist or checksum validation.
    #[error("invalid mnemonic: {0}")]
    InvalidMnemonic(String),

    /// Raw private key is not well-formed.
    #[error("invalid private key: {0}")]
    InvalidPrivateKey(String),

    /// A stored record exists but cannot be trusted.
    #[error("corrupted wallet record '{name}': {reason}")]
    CorruptedRecord {
        /// Wallet name (file stem).
        name: String,
        /// What was wrong with it.
        reason: String,
    },

    /// Requested export representation is unavailable for this wallet.
    #[error("cannot export {kind} wallet as {format}")]
    InvalidExportFormat {
        /// Kind of the stored wallet.
        kind: WalletKind,
        /// Requested representation.
        format: String,
    },

    /// Wallet kind cannot be produced by this operation.
    #[error("unsupported wallet kind for this operation: {0}")]
    UnsupportedKind(WalletKind),

    /// Name is not usable as a file name.
    #[error("invalid wallet name '{name}': {reason}")]
    InvalidWalletName {
        /// Rejected name.
        name: String,
        /// Rule it broke.
        reason: String,
    },

    /// Neither an explicit wallet nor an active wallet was given.
    #[error(
        "no wallet selected: pass a wallet name explicitly or set an active wallet with `wallet use <name>`"
    )]
    NoActiveWallet,

    /// Keystore blob is malformed or inconsistent.
    #[error("invalid keystore: {0}")]
    InvalidKeystore(String),

    /// Argon2 parameters were rejected.
    #[error("invalid KDF parameters: {0}")]
    InvalidKdfParams(String),

    /// Encryption failure.
    #[error("encryption: {0}")]
    Encryption(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(String),

    /// Serialization error.
    #[error("serialization: {0}")]
    Serialization(String),

    #[error(transparent)]
    Crypto(#[from] CryptoError),

    #[error(transparent)]
    Address(#[from] AddressError),

    #[error(transparent)]
    Chain(#[from] ChainError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl WalletError {
    pub(crate) fn corrupted(name: &str, reason: impl Into<String>) -> Self {
        WalletError::CorruptedRecord {
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}
