//! Collaborator interfaces consumed by the wallet manager.
//!
//! - [`ChainClient`] — balance lookups and broadcast for an address
//! - [`ConfigStore`] — persistence of the active wallet pointer
//!
//! Neither is owned by the wallet layer; both are passed into the
//! operations that need them.

use async_trait::async_trait;

use crate::address::Address;
use crate::error::{ChainError, ConfigError};
use crate::types::{Balance, SignedPayload};

/// Remote view of the chain for a single address.
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Native and token balances held by `address`.
    async fn get_balance(&self, address: &Address) -> Result<Balance, ChainError>;

    /// Submit a signed payload. Returns the transaction id assigned by the chain.
    async fn broadcast(&self, signed: &SignedPayload) -> Result<String, ChainError>;
}

/// Persistent settings shared across invocations.
///
/// Only the active wallet pointer is read or written through this trait.
pub trait ConfigStore: Send + Sync {
    fn get_active_wallet(&self) -> Result<Option<String>, ConfigError>;

    fn set_active_wallet(&self, name: &str) -> Result<(), ConfigError>;

    fn clear_active_wallet(&self) -> Result<(), ConfigError>;
}
