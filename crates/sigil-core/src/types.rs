//! Plain data exchanged with collaborators.

use serde::{Deserialize, Serialize};

use crate::crypto::PublicKey;

/// Holdings of a single token at an address, in base units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenBalance {
    pub symbol: String,
    pub amount: u64,
    pub decimals: u8,
}

impl TokenBalance {
    /// Amount scaled by `decimals` (display helper only).
    pub fn display_amount(&self) -> f64 {
        self.amount as f64 / 10f64.powi(i32::from(self.decimals))
    }
}

/// Balance report for one address.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balance {
    /// Native coin balance in base units.
    pub native: u64,
    #[serde(default)]
    pub tokens: Vec<TokenBalance>,
}

/// A payload together with the signature that authorizes it.
///
/// Produced by a wallet signer and handed to the chain client for
/// broadcast. The payload bytes are opaque here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedPayload {
    pub payload: Vec<u8>,
    pub public_key: PublicKey,
    pub signature: Vec<u8>,
}
