//! # sigil-core — key, address and collaborator types for Sigil.
//!
//! # Modules
//!
//! - [`address`] — Base58 wallet addresses with BLAKE3 checksum
//! - [`crypto`] — Ed25519 `KeyPair` / `PublicKey`
//! - [`error`] — error enums shared by all crates
//! - [`traits`] — `ChainClient` and `ConfigStore` collaborator interfaces
//! - [`types`] — balances and signed payloads

pub mod address;
pub mod crypto;
pub mod error;
pub mod traits;
pub mod types;

pub use address::Address;
pub use crypto::{KeyPair, PublicKey};
pub use traits::{ChainClient, ConfigStore};
pub use types::{Balance, SignedPayload, TokenBalance};
