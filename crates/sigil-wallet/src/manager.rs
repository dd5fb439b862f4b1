//! Wallet lifecycle: create, import, list, export, delete, and queries.
//!
//! [`WalletManager`] is the entry point the CLI drives. Every operation is
//! a short sequence of fallible steps over the record store and the
//! cipher; any failure leaves previously stored wallets untouched.
//! Decrypted key material lives only for the duration of the call that
//! produced it, except inside a [`WalletSigner`], which the caller drops
//! after its single signing operation.

use std::fmt;

use sigil_core::address::Address;
use sigil_core::crypto::{KeyPair, PublicKey};
use sigil_core::traits::{ChainClient, ConfigStore};
use sigil_core::types::{Balance, SignedPayload};
use tracing::{debug, info};
use zeroize::Zeroizing;

use crate::config::WalletConfig;
use crate::encryption::{self, KdfParams};
use crate::error::WalletError;
use crate::keys::{DecryptedKeyMaterial, WalletSecret};
use crate::keystore;
use crate::mnemonic;
use crate::record::{WalletKind, WalletRecord, WalletSummary, validate_name};
use crate::resolver;
use crate::store::WalletStore;

/// Associated data binding ciphertexts to the wallet record format.
const RECORD_AAD: &[u8] = b"sigil-wallet-record-v1";

/// Secret supplied to [`WalletManager::import`].
pub enum ImportSecret {
    /// BIP-39 recovery phrase.
    Mnemonic(Zeroizing<String>),
    /// Hex private key, optionally `0x`-prefixed.
    PrivateKey(Zeroizing<String>),
    /// Keystore JSON and the password it was sealed with.
    Keystore {
        json: String,
        password: Zeroizing<String>,
    },
}

impl ImportSecret {
    /// Classify free-form operator input: more than one word is a phrase,
    /// anything else is treated as a hex private key.
    pub fn from_text(input: &str) -> Self {
        if input.split_whitespace().nth(1).is_some() {
            ImportSecret::Mnemonic(Zeroizing::new(input.to_string()))
        } else {
            ImportSecret::PrivateKey(Zeroizing::new(input.trim().to_string()))
        }
    }

    pub fn kind(&self) -> WalletKind {
        match self {
            ImportSecret::Mnemonic(_) => WalletKind::Mnemonic,
            ImportSecret::PrivateKey(_) => WalletKind::PrivateKey,
            ImportSecret::Keystore { .. } => WalletKind::Keystore,
        }
    }
}

impl fmt::Debug for ImportSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ImportSecret::{}([REDACTED])", self.kind())
    }
}

/// Representation requested from [`WalletManager::export`].
pub enum ExportFormat {
    /// The stored recovery phrase. Mnemonic wallets only.
    Mnemonic,
    /// Hex private key of the wallet's signer.
    PrivateKey,
    /// Keystore JSON sealed under a new output password.
    Keystore { password: Zeroizing<String> },
}

impl ExportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::Mnemonic => "mnemonic",
            ExportFormat::PrivateKey => "private-key",
            ExportFormat::Keystore { .. } => "keystore",
        }
    }
}

impl fmt::Debug for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Secret returned by [`WalletManager::export`].
pub enum ExportedSecret {
    Mnemonic(Zeroizing<String>),
    PrivateKey(Zeroizing<String>),
    /// Keystore JSON. Safe to store; it is encrypted.
    Keystore(String),
}

impl ExportedSecret {
    /// Text to hand to the operator.
    pub fn expose(&self) -> &str {
        match self {
            ExportedSecret::Mnemonic(s) | ExportedSecret::PrivateKey(s) => s.as_str(),
            ExportedSecret::Keystore(json) => json,
        }
    }
}

impl fmt::Debug for ExportedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportedSecret::Mnemonic(_) => f.write_str("Mnemonic([REDACTED])"),
            ExportedSecret::PrivateKey(_) => f.write_str("PrivateKey([REDACTED])"),
            ExportedSecret::Keystore(_) => f.write_str("Keystore(..)"),
        }
    }
}

/// Result of [`WalletManager::create`].
///
/// `mnemonic` is the only copy of the phrase the manager will ever hand
/// out without a password. Show it once, then drop it.
pub struct CreatedWallet {
    pub name: String,
    pub address: Address,
    pub kind: WalletKind,
    pub mnemonic: Option<Zeroizing<String>>,
}

impl fmt::Debug for CreatedWallet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CreatedWallet")
            .field("name", &self.name)
            .field("address", &self.address)
            .field("kind", &self.kind)
            .field("mnemonic", &self.mnemonic.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// Orchestrates wallet operations over a [`WalletStore`].
#[derive(Debug, Clone)]
pub struct WalletManager {
    store: WalletStore,
    kdf: KdfParams,
}

impl WalletManager {
    pub fn new(config: &WalletConfig) -> Self {
        Self::with_store(WalletStore::new(config.wallets_dir()), config.kdf)
    }

    pub fn with_store(store: WalletStore, kdf: KdfParams) -> Self {
        Self { store, kdf }
    }

    pub fn store(&self) -> &WalletStore {
        &self.store
    }

    /// Generate a new wallet of `kind` and store it under `name`.
    pub fn create(
        &self,
        name: &str,
        password: &[u8],
        kind: WalletKind,
    ) -> Result<CreatedWallet, WalletError> {
        self.ensure_available(name)?;
        let (secret, phrase) = match kind {
            WalletKind::Mnemonic => {
                let phrase = mnemonic::generate();
                (WalletSecret::Mnemonic(phrase.clone()), Some(phrase))
            }
            WalletKind::PrivateKey => {
                let bytes = Zeroizing::new(KeyPair::generate().secret_bytes());
                (WalletSecret::PrivateKey(bytes), None)
            }
            WalletKind::Keystore => return Err(WalletError::UnsupportedKind(kind)),
        };

        let address = self.persist(name, password, kind, secret)?;
        info!(wallet = name, %address, %kind, "wallet created");
        Ok(CreatedWallet {
            name: name.to_string(),
            address,
            kind,
            mnemonic: phrase,
        })
    }

    /// Store an existing secret under `name`.
    pub fn import(
        &self,
        name: &str,
        password: &[u8],
        secret: ImportSecret,
    ) -> Result<Address, WalletError> {
        self.ensure_available(name)?;
        let kind = secret.kind();
        let secret = match secret {
            ImportSecret::Mnemonic(phrase) => WalletSecret::from_phrase(&phrase)?,
            ImportSecret::PrivateKey(key) => WalletSecret::from_private_key_hex(&key)?,
            ImportSecret::Keystore {
                json,
                password: keystore_password,
            } => {
                let keypair = keystore::import_keystore(&json, keystore_password.as_bytes())?;
                WalletSecret::PrivateKey(Zeroizing::new(keypair.secret_bytes()))
            }
        };

        let address = self.persist(name, password, kind, secret)?;
        info!(wallet = name, %address, %kind, "wallet imported");
        Ok(address)
    }

    /// Metadata for every readable wallet. Never decrypts.
    pub fn list(&self) -> Result<Vec<WalletSummary>, WalletError> {
        Ok(self
            .store
            .list()?
            .iter()
            .map(WalletRecord::summary)
            .collect())
    }

    /// Decrypt a wallet and return its secret in `format`.
    pub fn export(
        &self,
        name: &str,
        password: &[u8],
        format: ExportFormat,
    ) -> Result<ExportedSecret, WalletError> {
        let record = self.store.load(name)?;
        if matches!(format, ExportFormat::Mnemonic) && record.kind != WalletKind::Mnemonic {
            return Err(WalletError::InvalidExportFormat {
                kind: record.kind,
                format: format.as_str().to_string(),
            });
        }

        let material = self.unlock(&record, password)?;
        let exported = match &format {
            ExportFormat::Mnemonic => match material.secret() {
                WalletSecret::Mnemonic(phrase) => ExportedSecret::Mnemonic(phrase.clone()),
                WalletSecret::PrivateKey(_) => {
                    return Err(WalletError::corrupted(
                        name,
                        "mnemonic record holds a raw key",
                    ));
                }
            },
            ExportFormat::PrivateKey => ExportedSecret::PrivateKey(material.private_key_hex()),
            ExportFormat::Keystore {
                password: out_password,
            } => ExportedSecret::Keystore(keystore::export_keystore(
                material.keypair(),
                out_password.as_bytes(),
                &self.kdf,
            )?),
        };
        info!(wallet = name, format = format.as_str(), "wallet exported");
        Ok(exported)
    }

    /// Delete a wallet after proving ownership by decrypting it.
    ///
    /// Clears the active pointer when it names this wallet.
    pub fn delete(
        &self,
        name: &str,
        password: &[u8],
        config: &dyn ConfigStore,
    ) -> Result<(), WalletError> {
        let record = self.store.load(name)?;
        drop(self.unlock(&record, password)?);

        let was_active = config.get_active_wallet()?.as_deref() == Some(name);
        self.store.remove(name)?;
        if was_active {
            config.clear_active_wallet()?;
            debug!(wallet = name, "cleared active wallet pointer");
        }
        info!(wallet = name, "wallet deleted");
        Ok(())
    }

    /// Recorded address of a wallet. No password, no decryption.
    pub fn get_address(&self, name: &str) -> Result<Address, WalletError> {
        self.store.load(name)?.address()
    }

    /// Balance of a wallet, given either its address or its name.
    pub async fn get_balance(
        &self,
        name_or_address: &str,
        chain: &dyn ChainClient,
    ) -> Result<Balance, WalletError> {
        let address = match Address::decode(name_or_address) {
            Ok(address) => address,
            Err(_) => self.get_address(name_or_address)?,
        };
        debug!(%address, "querying balance");
        Ok(chain.get_balance(&address).await?)
    }

    /// Decrypt a wallet into a signer bound to `chain`.
    pub fn get_signer<'a>(
        &self,
        name: &str,
        password: &[u8],
        chain: &'a dyn ChainClient,
    ) -> Result<WalletSigner<'a>, WalletError> {
        let record = self.store.load(name)?;
        let material = self.unlock(&record, password)?;
        debug!(wallet = name, address = %material.address(), "signer unlocked");
        Ok(WalletSigner {
            name: record.name,
            material,
            chain,
        })
    }

    /// Make `name` the active wallet.
    pub fn use_wallet(&self, name: &str, config: &dyn ConfigStore) -> Result<(), WalletError> {
        resolver::use_wallet(&self.store, config, name)
    }

    /// The wallet an operation should target, if any.
    pub fn current(
        &self,
        explicit: Option<&str>,
        config: &dyn ConfigStore,
    ) -> Result<Option<String>, WalletError> {
        resolver::resolve(explicit, config)
    }

    /// Validate the name and check it is free before any KDF work.
    fn ensure_available(&self, name: &str) -> Result<(), WalletError> {
        validate_name(name)?;
        if self.store.exists(name) {
            return Err(WalletError::WalletAlreadyExists(name.to_string()));
        }
        Ok(())
    }

    fn persist(
        &self,
        name: &str,
        password: &[u8],
        kind: WalletKind,
        secret: WalletSecret,
    ) -> Result<Address, WalletError> {
        let material = DecryptedKeyMaterial::new(secret)?;
        let plaintext = material.secret().to_plaintext();
        let sealed = encryption::seal(&plaintext, password, &self.kdf, RECORD_AAD)?;
        let record = WalletRecord::new(name, material.address(), kind, &sealed, self.kdf);
        self.store.save(&record)?;
        Ok(material.address())
    }

    /// Decrypt a record and confirm the secret still derives its address.
    fn unlock(
        &self,
        record: &WalletRecord,
        password: &[u8],
    ) -> Result<DecryptedKeyMaterial, WalletError> {
        let sealed = record.sealed()?;
        let plaintext = encryption::open(&sealed, password, &record.kdf, RECORD_AAD)?;
        let secret = WalletSecret::from_plaintext(record.kind, &plaintext, &record.name)?;
        let material = DecryptedKeyMaterial::new(secret)
            .map_err(|e| WalletError::corrupted(&record.name, e.to_string()))?;
        if material.address() != record.address()? {
            return Err(WalletError::corrupted(
                &record.name,
                "decrypted secret does not derive the recorded address",
            ));
        }
        Ok(material)
    }
}

/// Unlocked wallet bound to a chain client for one signing operation.
pub struct WalletSigner<'a> {
    name: String,
    material: DecryptedKeyMaterial,
    chain: &'a dyn ChainClient,
}

impl WalletSigner<'_> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn address(&self) -> Address {
        self.material.address()
    }

    pub fn public_key(&self) -> PublicKey {
        self.material.public_key()
    }

    pub fn sign(&self, message: &[u8]) -> [u8; 64] {
        self.material.keypair().sign(message)
    }

    pub fn sign_payload(&self, payload: Vec<u8>) -> SignedPayload {
        let signature = self.sign(&payload).to_vec();
        SignedPayload {
            payload,
            public_key: self.public_key(),
            signature,
        }
    }

    /// Sign `payload` and broadcast it. Returns the chain's transaction id.
    pub async fn send(&self, payload: Vec<u8>) -> Result<String, WalletError> {
        let signed = self.sign_payload(payload);
        let txid = self.chain.broadcast(&signed).await?;
        info!(wallet = %self.name, %txid, "payload broadcast");
        Ok(txid)
    }
}

impl fmt::Debug for WalletSigner<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalletSigner")
            .field("name", &self.name)
            .field("address", &self.address())
            .finish_non_exhaustive()
    }
}
