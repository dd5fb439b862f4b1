//! Shared fixtures for integration tests.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::Mutex;
use sigil_core::address::Address;
use sigil_core::error::ChainError;
use sigil_core::traits::ChainClient;
use sigil_core::types::{Balance, SignedPayload};
use sigil_wallet::{KdfParams, WalletConfig, WalletManager};

/// The 12-word BIP-39 test vector phrase.
pub const TEST_PHRASE: &str = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

/// Argon2 cost low enough for tests to run in milliseconds.
pub fn light_kdf() -> KdfParams {
    KdfParams {
        m_cost: 256,
        t_cost: 1,
        p_cost: 1,
    }
}

/// Config rooted in a fresh temp directory.
pub fn test_config() -> (WalletConfig, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let config = WalletConfig {
        kdf: light_kdf(),
        ..WalletConfig::with_data_dir(dir.path())
    };
    (config, dir)
}

/// Manager over a fresh temp directory with light KDF cost.
pub fn test_manager() -> (WalletManager, tempfile::TempDir) {
    let (config, dir) = test_config();
    (WalletManager::new(&config), dir)
}

/// In-memory chain client recording every broadcast.
#[derive(Default)]
pub struct MockChainClient {
    balances: Mutex<HashMap<Address, Balance>>,
    broadcasts: Mutex<Vec<SignedPayload>>,
    offline: bool,
}

impl MockChainClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// A client whose every call fails as unreachable.
    pub fn offline() -> Self {
        Self {
            offline: true,
            ..Self::default()
        }
    }

    pub fn set_balance(&self, address: Address, balance: Balance) {
        self.balances.lock().insert(address, balance);
    }

    pub fn broadcasts(&self) -> Vec<SignedPayload> {
        self.broadcasts.lock().clone()
    }
}

#[async_trait]
impl ChainClient for MockChainClient {
    async fn get_balance(&self, address: &Address) -> Result<Balance, ChainError> {
        if self.offline {
            return Err(ChainError::Unavailable("mock chain offline".into()));
        }
        Ok(self
            .balances
            .lock()
            .get(address)
            .cloned()
            .unwrap_or_default())
    }

    async fn broadcast(&self, signed: &SignedPayload) -> Result<String, ChainError> {
        if self.offline {
            return Err(ChainError::Unavailable("mock chain offline".into()));
        }
        let mut sent = self.broadcasts.lock();
        sent.push(signed.clone());
        Ok(format!("mock-tx-{}", sent.len()))
    }
}
