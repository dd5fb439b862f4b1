//! Secret key material and signer derivation.
//!
//! A wallet stores exactly one secret: a recovery phrase or a raw Ed25519
//! private key. Mnemonic wallets derive their signer by running the BIP-39
//! seed through BLAKE3's keyed derivation. Every type here that holds
//! plaintext secret bytes is wiped on drop and redacted in `Debug`.

use std::fmt;

use sigil_core::address::Address;
use sigil_core::crypto::{KeyPair, PublicKey, SECRET_KEY_LEN};
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::error::WalletError;
use crate::mnemonic;
use crate::record::WalletKind;

/// BLAKE3 KDF context for mnemonic-to-signer derivation.
const KDF_CONTEXT: &str = "sigil-wallet-key-derivation-v1";

/// Account index used for a wallet's single signing key.
pub const ACCOUNT_INDEX: u32 = 0;

/// A 64-byte BIP-39 seed.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct Seed {
    bytes: [u8; 64],
}

impl Seed {
    pub fn from_bytes(bytes: [u8; 64]) -> Self {
        Self { bytes }
    }

    /// Get the raw seed bytes. Handle with care.
    pub fn as_bytes(&self) -> &[u8; 64] {
        &self.bytes
    }
}

impl fmt::Debug for Seed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Seed").field("bytes", &"[REDACTED]").finish()
    }
}

/// Derive the keypair at `index` from a seed.
pub fn derive_keypair(seed: &Seed, index: u32) -> KeyPair {
    let mut ikm = Zeroizing::new(Vec::with_capacity(68));
    ikm.extend_from_slice(seed.as_bytes());
    ikm.extend_from_slice(&index.to_le_bytes());
    let derived = Zeroizing::new(blake3::derive_key(KDF_CONTEXT, &ikm));
    KeyPair::from_secret_bytes(*derived)
}

/// Parse a hex-encoded private key (optional `0x` prefix).
pub fn parse_private_key(input: &str) -> Result<Zeroizing<[u8; SECRET_KEY_LEN]>, WalletError> {
    let trimmed = input.trim();
    let hex_part = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    if hex_part.len() != SECRET_KEY_LEN * 2 {
        return Err(WalletError::InvalidPrivateKey(format!(
            "expected {} hex characters, got {}",
            SECRET_KEY_LEN * 2,
            hex_part.len()
        )));
    }
    let mut bytes = Zeroizing::new([0u8; SECRET_KEY_LEN]);
    hex::decode_to_slice(hex_part, &mut bytes[..])
        .map_err(|e| WalletError::InvalidPrivateKey(e.to_string()))?;
    if bytes.iter().all(|&b| b == 0) {
        return Err(WalletError::InvalidPrivateKey("all-zero key".into()));
    }
    Ok(bytes)
}

/// The one secret held by a wallet.
pub enum WalletSecret {
    /// Normalized recovery phrase.
    Mnemonic(Zeroizing<String>),
    /// Raw Ed25519 secret key.
    PrivateKey(Zeroizing<[u8; SECRET_KEY_LEN]>),
}

impl WalletSecret {
    /// Validate and normalize a recovery phrase.
    pub fn from_phrase(phrase: &str) -> Result<Self, WalletError> {
        mnemonic::parse(phrase)?;
        Ok(WalletSecret::Mnemonic(mnemonic::normalize(phrase)))
    }

    /// Validate a hex private key.
    pub fn from_private_key_hex(input: &str) -> Result<Self, WalletError> {
        parse_private_key(input).map(WalletSecret::PrivateKey)
    }

    /// Derive the signing keypair for this secret.
    pub fn keypair(&self) -> Result<KeyPair, WalletError> {
        match self {
            WalletSecret::Mnemonic(phrase) => {
                let seed = mnemonic::phrase_to_seed(phrase)?;
                Ok(derive_keypair(&seed, ACCOUNT_INDEX))
            }
            WalletSecret::PrivateKey(bytes) => Ok(KeyPair::from_secret_bytes(**bytes)),
        }
    }

    /// Bytes to encrypt into a wallet record.
    pub fn to_plaintext(&self) -> Zeroizing<Vec<u8>> {
        match self {
            WalletSecret::Mnemonic(phrase) => Zeroizing::new(phrase.as_bytes().to_vec()),
            WalletSecret::PrivateKey(bytes) => Zeroizing::new(bytes.to_vec()),
        }
    }

    /// Rebuild a secret from decrypted record bytes.
    ///
    /// `name` is only used to label corruption errors.
    pub fn from_plaintext(kind: WalletKind, plaintext: &[u8], name: &str) -> Result<Self, WalletError> {
        match kind {
            WalletKind::Mnemonic => {
                let phrase = std::str::from_utf8(plaintext)
                    .map_err(|_| WalletError::corrupted(name, "stored phrase is not UTF-8"))?;
                Self::from_phrase(phrase)
                    .map_err(|e| WalletError::corrupted(name, format!("stored phrase: {e}")))
            }
            WalletKind::PrivateKey | WalletKind::Keystore => {
                let key: [u8; SECRET_KEY_LEN] = plaintext.try_into().map_err(|_| {
                    WalletError::corrupted(
                        name,
                        format!("stored key has {} bytes", plaintext.len()),
                    )
                })?;
                Ok(WalletSecret::PrivateKey(Zeroizing::new(key)))
            }
        }
    }
}

impl fmt::Debug for WalletSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WalletSecret::Mnemonic(_) => f.write_str("Mnemonic([REDACTED])"),
            WalletSecret::PrivateKey(_) => f.write_str("PrivateKey([REDACTED])"),
        }
    }
}

/// Plaintext secret plus the signer derived from it.
///
/// Never persisted or cached; drop it as soon as the operation that
/// decrypted it completes.
pub struct DecryptedKeyMaterial {
    secret: WalletSecret,
    keypair: KeyPair,
    address: Address,
}

impl DecryptedKeyMaterial {
    pub fn new(secret: WalletSecret) -> Result<Self, WalletError> {
        let keypair = secret.keypair()?;
        let address = Address::from_public_key(&keypair.public_key());
        Ok(Self {
            secret,
            keypair,
            address,
        })
    }

    pub fn secret(&self) -> &WalletSecret {
        &self.secret
    }

    pub fn keypair(&self) -> &KeyPair {
        &self.keypair
    }

    pub fn public_key(&self) -> PublicKey {
        self.keypair.public_key()
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// Hex encoding of the signing key.
    pub fn private_key_hex(&self) -> Zeroizing<String> {
        let bytes = Zeroizing::new(self.keypair.secret_bytes());
        Zeroizing::new(hex::encode(&bytes[..]))
    }
}

impl fmt::Debug for DecryptedKeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecryptedKeyMaterial")
            .field("secret", &self.secret)
            .field("address", &self.address)
            .finish()
    }
}
