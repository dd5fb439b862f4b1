//! On-disk wallet record.
//!
//! One JSON file per wallet. Byte fields are hex; `createdAt` is RFC 3339.
//!
//! ```json
//! {
//!   "name": "main",
//!   "address": "...",
//!   "encryptedData": "...",
//!   "salt": "...",
//!   "iv": "...",
//!   "type": "mnemonic",
//!   "createdAt": "2026-01-01T00:00:00Z",
//!   "version": "1",
//!   "kdf": { "mCost": 19456, "tCost": 2, "pCost": 1 }
//! }
//! ```

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sigil_core::address::Address;

use crate::encryption::{KdfParams, NONCE_LEN, SALT_LEN, Sealed};
use crate::error::WalletError;

/// Current record format version.
pub const RECORD_VERSION: u32 = 1;

/// Maximum wallet name length.
pub const MAX_NAME_LEN: usize = 64;

/// What kind of secret a wallet holds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WalletKind {
    /// BIP-39 recovery phrase.
    Mnemonic,
    /// Raw private key, generated or imported.
    PrivateKey,
    /// Private key imported from a keystore blob.
    Keystore,
}

impl WalletKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            WalletKind::Mnemonic => "mnemonic",
            WalletKind::PrivateKey => "private-key",
            WalletKind::Keystore => "keystore",
        }
    }
}

impl fmt::Display for WalletKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WalletKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mnemonic" => Ok(WalletKind::Mnemonic),
            "private-key" | "privatekey" | "key" => Ok(WalletKind::PrivateKey),
            "keystore" => Ok(WalletKind::Keystore),
            other => Err(format!(
                "unknown wallet type '{other}' (expected mnemonic, private-key or keystore)"
            )),
        }
    }
}

/// Persisted wallet: public metadata plus the sealed secret.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletRecord {
    pub name: String,
    pub address: String,
    pub encrypted_data: String,
    pub salt: String,
    pub iv: String,
    #[serde(rename = "type")]
    pub kind: WalletKind,
    pub created_at: DateTime<Utc>,
    pub version: String,
    /// Absent in records written before cost parameters were stored.
    #[serde(default)]
    pub kdf: KdfParams,
}

impl WalletRecord {
    /// Build a record around a freshly sealed secret.
    pub fn new(
        name: &str,
        address: Address,
        kind: WalletKind,
        sealed: &Sealed,
        kdf: KdfParams,
    ) -> Self {
        Self {
            name: name.to_string(),
            address: address.encode(),
            encrypted_data: hex::encode(&sealed.ciphertext),
            salt: hex::encode(sealed.salt),
            iv: hex::encode(sealed.nonce),
            kind,
            created_at: Utc::now(),
            version: RECORD_VERSION.to_string(),
            kdf,
        }
    }

    /// Parsed format version.
    pub fn format_version(&self) -> Result<u32, WalletError> {
        self.version
            .trim()
            .parse()
            .map_err(|_| WalletError::corrupted(&self.name, format!("bad version '{}'", self.version)))
    }

    /// Recorded address.
    pub fn address(&self) -> Result<Address, WalletError> {
        Address::decode(&self.address)
            .map_err(|e| WalletError::corrupted(&self.name, format!("address: {e}")))
    }

    /// Decode the hex fields back into a [`Sealed`] blob.
    pub fn sealed(&self) -> Result<Sealed, WalletError> {
        Ok(Sealed {
            salt: decode_fixed::<SALT_LEN>(&self.name, "salt", &self.salt)?,
            nonce: decode_fixed::<NONCE_LEN>(&self.name, "iv", &self.iv)?,
            ciphertext: hex::decode(&self.encrypted_data)
                .map_err(|e| WalletError::corrupted(&self.name, format!("encryptedData: {e}")))?,
        })
    }

    /// Structural checks run on every load.
    ///
    /// `expected_name` is the file stem the record was read from.
    pub fn check(&self, expected_name: &str) -> Result<(), WalletError> {
        if self.name != expected_name {
            return Err(WalletError::corrupted(
                expected_name,
                format!("record names '{}'", self.name),
            ));
        }
        let version = self.format_version()?;
        if version != RECORD_VERSION {
            return Err(WalletError::corrupted(
                &self.name,
                format!("unsupported version {version}"),
            ));
        }
        self.address()?;
        self.sealed()?;
        self.kdf
            .validate()
            .map_err(|e| WalletError::corrupted(&self.name, e.to_string()))?;
        Ok(())
    }

    pub fn summary(&self) -> WalletSummary {
        WalletSummary {
            name: self.name.clone(),
            address: self.address.clone(),
            kind: self.kind,
            created_at: self.created_at,
        }
    }
}

fn decode_fixed<const N: usize>(name: &str, field: &str, value: &str) -> Result<[u8; N], WalletError> {
    let mut out = [0u8; N];
    hex::decode_to_slice(value, &mut out)
        .map_err(|e| WalletError::corrupted(name, format!("{field}: {e}")))?;
    Ok(out)
}

/// Metadata shown by `list`; never includes secret fields.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletSummary {
    pub name: String,
    pub address: String,
    #[serde(rename = "type")]
    pub kind: WalletKind,
    pub created_at: DateTime<Utc>,
}

/// Check that `name` is usable as a record file name.
pub fn validate_name(name: &str) -> Result<(), WalletError> {
    let reject = |reason: &str| {
        Err(WalletError::InvalidWalletName {
            name: name.to_string(),
            reason: reason.to_string(),
        })
    };
    if name.is_empty() {
        return reject("name is empty");
    }
    if name.len() > MAX_NAME_LEN {
        return reject("name is longer than 64 characters");
    }
    if name.starts_with('.') {
        return reject("name may not start with '.'");
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
    {
        return reject("only letters, digits, '-', '_' and '.' are allowed");
    }
    Ok(())
}
