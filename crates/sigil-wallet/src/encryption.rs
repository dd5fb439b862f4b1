//! Password-based key derivation and AES-256-GCM sealing.
//!
//! Keys are derived with Argon2id from the password and a per-wallet salt.
//! Salt and nonce are generated fresh for every seal and stored next to
//! the ciphertext; neither is secret. A wrong password surfaces as a GCM
//! tag mismatch and is reported as [`WalletError::InvalidPassword`].

use aes_gcm::aead::{Aead, KeyInit, Payload};
use aes_gcm::{Aes256Gcm, Nonce};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::error::WalletError;

/// Salt length in bytes.
pub const SALT_LEN: usize = 32;

/// AES-GCM nonce length in bytes.
pub const NONCE_LEN: usize = 12;

/// Length of the GCM authentication tag appended to every ciphertext.
pub const TAG_LEN: usize = 16;

/// Largest accepted Argon2 memory cost in KiB (1 GiB).
pub const MAX_M_COST: u32 = 1024 * 1024;

/// Largest accepted Argon2 pass count.
pub const MAX_T_COST: u32 = 64;

/// Largest accepted Argon2 lane count.
pub const MAX_P_COST: u32 = 16;

/// Argon2id cost parameters.
///
/// Persisted next to every ciphertext so that records sealed under older
/// settings stay readable after the defaults change.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KdfParams {
    /// Memory cost in KiB.
    pub m_cost: u32,
    /// Number of passes.
    pub t_cost: u32,
    /// Lanes.
    pub p_cost: u32,
}

impl Default for KdfParams {
    fn default() -> Self {
        Self {
            m_cost: 19_456,
            t_cost: 2,
            p_cost: 1,
        }
    }
}

impl KdfParams {
    /// Reject costs outside what this crate will run.
    ///
    /// Params read from disk or from a keystore are untrusted; an oversized
    /// memory cost aborts the process inside Argon2 instead of returning.
    pub fn validate(&self) -> Result<(), WalletError> {
        if self.p_cost == 0 || self.p_cost > MAX_P_COST {
            return Err(WalletError::InvalidKdfParams(format!(
                "pCost {} outside 1..={MAX_P_COST}",
                self.p_cost
            )));
        }
        if self.t_cost == 0 || self.t_cost > MAX_T_COST {
            return Err(WalletError::InvalidKdfParams(format!(
                "tCost {} outside 1..={MAX_T_COST}",
                self.t_cost
            )));
        }
        let min_m_cost = 8 * self.p_cost;
        if self.m_cost < min_m_cost || self.m_cost > MAX_M_COST {
            return Err(WalletError::InvalidKdfParams(format!(
                "mCost {} outside {min_m_cost}..={MAX_M_COST}",
                self.m_cost
            )));
        }
        Ok(())
    }
}

/// 256-bit symmetric key derived from a password. Wiped on drop.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct DerivedKey([u8; 32]);

impl DerivedKey {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

/// Ciphertext together with the salt and nonce needed to open it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Sealed {
    pub salt: [u8; SALT_LEN],
    pub nonce: [u8; NONCE_LEN],
    pub ciphertext: Vec<u8>,
}

/// Fresh random salt from the OS RNG.
pub fn generate_salt() -> [u8; SALT_LEN] {
    let mut salt = [0u8; SALT_LEN];
    rand::rngs::OsRng.fill_bytes(&mut salt);
    salt
}

/// Fresh random nonce from the OS RNG.
pub fn generate_nonce() -> [u8; NONCE_LEN] {
    let mut nonce = [0u8; NONCE_LEN];
    rand::rngs::OsRng.fill_bytes(&mut nonce);
    nonce
}

/// Derive a 256-bit key from `password` and `salt` with Argon2id.
///
/// Deterministic for a given `(password, salt, params)`.
pub fn derive_key(
    password: &[u8],
    salt: &[u8; SALT_LEN],
    params: &KdfParams,
) -> Result<DerivedKey, WalletError> {
    params.validate()?;
    let argon2_params = argon2::Params::new(params.m_cost, params.t_cost, params.p_cost, Some(32))
        .map_err(|e| WalletError::InvalidKdfParams(e.to_string()))?;
    let argon2 = argon2::Argon2::new(
        argon2::Algorithm::Argon2id,
        argon2::Version::V0x13,
        argon2_params,
    );

    let mut key = DerivedKey([0u8; 32]);
    argon2
        .hash_password_into(password, salt, &mut key.0)
        .map_err(|e| WalletError::InvalidKdfParams(e.to_string()))?;
    Ok(key)
}

/// Encrypt `plaintext` under `key`. `aad` is authenticated but not stored.
pub fn encrypt(
    plaintext: &[u8],
    key: &DerivedKey,
    nonce: &[u8; NONCE_LEN],
    aad: &[u8],
) -> Result<Vec<u8>, WalletError> {
    let cipher = Aes256Gcm::new_from_slice(key.as_bytes())
        .map_err(|e| WalletError::Encryption(e.to_string()))?;
    cipher
        .encrypt(Nonce::from_slice(nonce), Payload { msg: plaintext, aad })
        .map_err(|e| WalletError::Encryption(e.to_string()))
}

/// Decrypt a ciphertext produced by [`encrypt`].
///
/// Any authentication failure (wrong key, wrong nonce, wrong `aad`,
/// tampered bytes) yields [`WalletError::InvalidPassword`]; no partially
/// decoded plaintext is ever returned.
pub fn decrypt(
    ciphertext: &[u8],
    key: &DerivedKey,
    nonce: &[u8; NONCE_LEN],
    aad: &[u8],
) -> Result<Zeroizing<Vec<u8>>, WalletError> {
    let cipher = Aes256Gcm::new_from_slice(key.as_bytes())
        .map_err(|e| WalletError::Encryption(e.to_string()))?;
    cipher
        .decrypt(Nonce::from_slice(nonce), Payload { msg: ciphertext, aad })
        .map(Zeroizing::new)
        .map_err(|_| WalletError::InvalidPassword)
}

/// Derive a key under a fresh salt and encrypt under a fresh nonce.
pub fn seal(
    plaintext: &[u8],
    password: &[u8],
    params: &KdfParams,
    aad: &[u8],
) -> Result<Sealed, WalletError> {
    let salt = generate_salt();
    let nonce = generate_nonce();
    let key = derive_key(password, &salt, params)?;
    let ciphertext = encrypt(plaintext, &key, &nonce, aad)?;
    Ok(Sealed {
        salt,
        nonce,
        ciphertext,
    })
}

/// Re-derive the key from `password` and open a [`Sealed`] blob.
pub fn open(
    sealed: &Sealed,
    password: &[u8],
    params: &KdfParams,
    aad: &[u8],
) -> Result<Zeroizing<Vec<u8>>, WalletError> {
    let key = derive_key(password, &sealed.salt, params)?;
    decrypt(&sealed.ciphertext, &key, &sealed.nonce, aad)
}
