//! Wallet address encoding.
//!
//! An address is the Base58 rendering of
//!
//! ```text
//! version (1 byte) || BLAKE3(pubkey)[..20] || checksum (4 bytes)
//! ```
//!
//! where the checksum is the leading four bytes of BLAKE3 over the
//! version and hash. Addresses are public and safe to log.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::crypto::PublicKey;
use crate::error::AddressError;

/// Version byte prefixed to every address payload.
pub const ADDRESS_VERSION: u8 = 0x3f;

/// Length of the key hash carried in an address.
pub const ADDRESS_HASH_LEN: usize = 20;

const CHECKSUM_LEN: usize = 4;
const RAW_LEN: usize = 1 + ADDRESS_HASH_LEN + CHECKSUM_LEN;

/// Public identifier derived from a wallet's signing key.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Address {
    hash: [u8; ADDRESS_HASH_LEN],
}

impl Address {
    /// Derive the address of a public key.
    pub fn from_public_key(public_key: &PublicKey) -> Self {
        let digest = public_key.key_hash();
        let mut hash = [0u8; ADDRESS_HASH_LEN];
        hash.copy_from_slice(&digest[..ADDRESS_HASH_LEN]);
        Self { hash }
    }

    pub fn from_hash(hash: [u8; ADDRESS_HASH_LEN]) -> Self {
        Self { hash }
    }

    pub fn hash(&self) -> &[u8; ADDRESS_HASH_LEN] {
        &self.hash
    }

    /// Encode as a Base58 string.
    pub fn encode(&self) -> String {
        let mut raw = Vec::with_capacity(RAW_LEN);
        raw.push(ADDRESS_VERSION);
        raw.extend_from_slice(&self.hash);
        let sum = checksum(&raw);
        raw.extend_from_slice(&sum);
        bs58::encode(raw).into_string()
    }

    /// Decode and verify a Base58 address string.
    pub fn decode(s: &str) -> Result<Self, AddressError> {
        let raw = bs58::decode(s.trim())
            .into_vec()
            .map_err(|e| AddressError::InvalidEncoding(e.to_string()))?;
        if raw.len() != RAW_LEN {
            return Err(AddressError::InvalidLength(raw.len()));
        }
        if raw[0] != ADDRESS_VERSION {
            return Err(AddressError::InvalidVersion(raw[0]));
        }
        let (body, sum) = raw.split_at(1 + ADDRESS_HASH_LEN);
        if checksum(body).as_slice() != sum {
            return Err(AddressError::InvalidChecksum);
        }
        let mut hash = [0u8; ADDRESS_HASH_LEN];
        hash.copy_from_slice(&body[1..]);
        Ok(Self { hash })
    }
}

fn checksum(body: &[u8]) -> [u8; CHECKSUM_LEN] {
    let digest = blake3::hash(body);
    let mut out = [0u8; CHECKSUM_LEN];
    out.copy_from_slice(&digest.as_bytes()[..CHECKSUM_LEN]);
    out
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.encode())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.encode())
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::decode(s)
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.encode())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::decode(&s).map_err(serde::de::Error::custom)
    }
}
