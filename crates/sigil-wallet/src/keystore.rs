//! Portable password-protected keystore blobs.
//!
//! A keystore carries a single Ed25519 private key sealed under its own
//! password, which is unrelated to the password protecting the local
//! wallet record. The embedded address lets an importer detect a blob
//! that decrypts cleanly but holds a different key.

use serde::{Deserialize, Serialize};
use sigil_core::address::Address;
use sigil_core::crypto::{KeyPair, SECRET_KEY_LEN};
use zeroize::Zeroizing;

use crate::encryption::{self, KdfParams, NONCE_LEN, SALT_LEN, Sealed};
use crate::error::WalletError;

/// Keystore format version.
pub const KEYSTORE_VERSION: u32 = 1;

const CIPHER_NAME: &str = "aes-256-gcm";
const KDF_NAME: &str = "argon2id";

/// Associated data binding ciphertexts to the keystore format.
const KEYSTORE_AAD: &[u8] = b"sigil-keystore-v1";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeystoreFile {
    pub version: u32,
    pub address: String,
    pub crypto: KeystoreCrypto,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeystoreCrypto {
    pub cipher: String,
    pub ciphertext: String,
    pub nonce: String,
    pub kdf: String,
    pub kdfparams: KeystoreKdfParams,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeystoreKdfParams {
    pub m_cost: u32,
    pub t_cost: u32,
    pub p_cost: u32,
    pub salt: String,
}

/// Seal `keypair` under `password` and render the keystore as pretty JSON.
pub fn export_keystore(
    keypair: &KeyPair,
    password: &[u8],
    params: &KdfParams,
) -> Result<String, WalletError> {
    let secret = Zeroizing::new(keypair.secret_bytes());
    let sealed = encryption::seal(&secret[..], password, params, KEYSTORE_AAD)?;
    let file = KeystoreFile {
        version: KEYSTORE_VERSION,
        address: Address::from_public_key(&keypair.public_key()).encode(),
        crypto: KeystoreCrypto {
            cipher: CIPHER_NAME.to_string(),
            ciphertext: hex::encode(&sealed.ciphertext),
            nonce: hex::encode(sealed.nonce),
            kdf: KDF_NAME.to_string(),
            kdfparams: KeystoreKdfParams {
                m_cost: params.m_cost,
                t_cost: params.t_cost,
                p_cost: params.p_cost,
                salt: hex::encode(sealed.salt),
            },
        },
    };
    serde_json::to_string_pretty(&file).map_err(|e| WalletError::Serialization(e.to_string()))
}

/// Parse a keystore blob, decrypt it with `password` and check that the
/// recovered key owns the embedded address.
pub fn import_keystore(json: &str, password: &[u8]) -> Result<KeyPair, WalletError> {
    let file: KeystoreFile =
        serde_json::from_str(json).map_err(|e| WalletError::InvalidKeystore(e.to_string()))?;
    if file.version != KEYSTORE_VERSION {
        return Err(WalletError::InvalidKeystore(format!(
            "unsupported version {}",
            file.version
        )));
    }
    let crypto = &file.crypto;
    if !crypto.cipher.eq_ignore_ascii_case(CIPHER_NAME) {
        return Err(WalletError::InvalidKeystore(format!(
            "unsupported cipher '{}'",
            crypto.cipher
        )));
    }
    if !crypto.kdf.eq_ignore_ascii_case(KDF_NAME) {
        return Err(WalletError::InvalidKeystore(format!(
            "unsupported kdf '{}'",
            crypto.kdf
        )));
    }
    let expected = Address::decode(&file.address)
        .map_err(|e| WalletError::InvalidKeystore(format!("address: {e}")))?;

    let sealed = Sealed {
        salt: decode_field::<SALT_LEN>("salt", &crypto.kdfparams.salt)?,
        nonce: decode_field::<NONCE_LEN>("nonce", &crypto.nonce)?,
        ciphertext: hex::decode(&crypto.ciphertext)
            .map_err(|e| WalletError::InvalidKeystore(format!("ciphertext: {e}")))?,
    };
    let params = KdfParams {
        m_cost: crypto.kdfparams.m_cost,
        t_cost: crypto.kdfparams.t_cost,
        p_cost: crypto.kdfparams.p_cost,
    };
    params
        .validate()
        .map_err(|e| WalletError::InvalidKeystore(e.to_string()))?;

    let plaintext = encryption::open(&sealed, password, &params, KEYSTORE_AAD)?;
    if plaintext.len() != SECRET_KEY_LEN {
        return Err(WalletError::InvalidKeystore(format!(
            "decrypted key has {} bytes",
            plaintext.len()
        )));
    }
    let keypair = KeyPair::from_secret_slice(&plaintext)?;
    if Address::from_public_key(&keypair.public_key()) != expected {
        return Err(WalletError::InvalidKeystore(
            "decrypted key does not match keystore address".into(),
        ));
    }
    Ok(keypair)
}

fn decode_field<const N: usize>(field: &str, value: &str) -> Result<[u8; N], WalletError> {
    let mut out = [0u8; N];
    hex::decode_to_slice(value, &mut out)
        .map_err(|e| WalletError::InvalidKeystore(format!("{field}: {e}")))?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encryption::tests::test_params;

    fn keypair() -> KeyPair {
        KeyPair::from_secret_bytes([0x42; 32])
    }

    #[test]
    fn export_import_roundtrip() {
        let kp = keypair();
        let json = export_keystore(&kp, b"out-pw", &test_params()).unwrap();
        let back = import_keystore(&json, b"out-pw").unwrap();
        assert_eq!(back.public_key(), kp.public_key());
    }

    #[test]
    fn export_shape() {
        let json = export_keystore(&keypair(), b"pw", &test_params()).unwrap();
        let v: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(v["version"], 1);
        assert_eq!(v["crypto"]["cipher"], "aes-256-gcm");
        assert_eq!(v["crypto"]["kdf"], "argon2id");
        assert_eq!(v["crypto"]["kdfparams"]["mCost"], 256);
        assert!(v["crypto"]["kdfparams"]["salt"].is_string());
        assert_eq!(
            v["address"],
            Address::from_public_key(&keypair().public_key()).encode()
        );
    }

    #[test]
    fn blob_does_not_contain_plain_key() {
        let kp = keypair();
        let json = export_keystore(&kp, b"pw", &test_params()).unwrap();
        assert!(!json.contains(&hex::encode(kp.secret_bytes())));
    }

    #[test]
    fn wrong_password_rejected() {
        let json = export_keystore(&keypair(), b"right", &test_params()).unwrap();
        assert_eq!(
            import_keystore(&json, b"wrong").unwrap_err(),
            WalletError::InvalidPassword
        );
    }

    #[test]
    fn address_mismatch_rejected() {
        let json = export_keystore(&keypair(), b"pw", &test_params()).unwrap();
        let mut file: KeystoreFile = serde_json::from_str(&json).unwrap();
        let other = KeyPair::from_secret_bytes([0x07; 32]);
        file.address = Address::from_public_key(&other.public_key()).encode();
        let tampered = serde_json::to_string(&file).unwrap();
        assert!(matches!(
            import_keystore(&tampered, b"pw").unwrap_err(),
            WalletError::InvalidKeystore(_)
        ));
    }

    #[test]
    fn malformed_json_rejected() {
        assert!(matches!(
            import_keystore("{\"version\": 1}", b"pw").unwrap_err(),
            WalletError::InvalidKeystore(_)
        ));
    }

    #[test]
    fn unknown_cipher_rejected() {
        let json = export_keystore(&keypair(), b"pw", &test_params()).unwrap();
        let mut file: KeystoreFile = serde_json::from_str(&json).unwrap();
        file.crypto.cipher = "aes-128-ctr".into();
        let err = import_keystore(&serde_json::to_string(&file).unwrap(), b"pw").unwrap_err();
        assert!(matches!(err, WalletError::InvalidKeystore(_)));
    }

    #[test]
    fn oversized_kdf_costs_rejected() {
        let json = export_keystore(&keypair(), b"pw", &test_params()).unwrap();
        let edits: [fn(&mut KeystoreKdfParams); 3] = [
            |p| p.m_cost = u32::MAX,
            |p| p.t_cost = u32::MAX,
            |p| p.p_cost = u32::MAX,
        ];
        for edit in edits {
            let mut file: KeystoreFile = serde_json::from_str(&json).unwrap();
            edit(&mut file.crypto.kdfparams);
            let err = import_keystore(&serde_json::to_string(&file).unwrap(), b"pw").unwrap_err();
            assert!(matches!(err, WalletError::InvalidKeystore(_)), "{err}");
        }
    }

    #[test]
    fn future_version_rejected() {
        let json = export_keystore(&keypair(), b"pw", &test_params()).unwrap();
        let mut file: KeystoreFile = serde_json::from_str(&json).unwrap();
        file.version = 3;
        let err = import_keystore(&serde_json::to_string(&file).unwrap(), b"pw").unwrap_err();
        assert!(matches!(err, WalletError::InvalidKeystore(_)));
    }
}
