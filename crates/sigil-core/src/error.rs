//! Error types shared across Sigil crates.
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    #[error("invalid public key bytes")] InvalidPublicKey,
    #[error("invalid secret key: {0}")] InvalidSecretKey(String),
    #[error("signature verification failed")] VerificationFailed,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    #[error("invalid base58: {0}")] InvalidEncoding(String),
    #[error("invalid length: {0}")] InvalidLength(usize),
    #[error("invalid version: {0:#04x}")] InvalidVersion(u8),
    #[error("invalid checksum")] InvalidChecksum,
}

/// Failures reported by a [`ChainClient`](crate::traits::ChainClient).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChainError {
    #[error("chain client unavailable: {0}")] Unavailable(String),
    #[error("rpc error: {0}")] Rpc(String),
    #[error("unexpected response: {0}")] InvalidResponse(String),
    #[error("broadcast rejected: {0}")] Rejected(String),
}

/// Failures reported by a [`ConfigStore`](crate::traits::ConfigStore).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("config I/O: {0}")] Io(String),
    #[error("config parse: {0}")] Parse(String),
}
