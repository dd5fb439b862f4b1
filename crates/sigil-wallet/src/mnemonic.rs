//! BIP-39 recovery phrase generation and validation.

use bip39::{Language, Mnemonic};
use rand::RngCore;
use zeroize::Zeroizing;

use crate::error::WalletError;
use crate::keys::Seed;

/// Entropy for generated phrases; 32 bytes gives 24 words.
const GENERATED_ENTROPY_LEN: usize = 32;

/// Generate a fresh 24-word English recovery phrase from OS entropy.
pub fn generate() -> Zeroizing<String> {
    let mut entropy = Zeroizing::new([0u8; GENERATED_ENTROPY_LEN]);
    rand::rngs::OsRng.fill_bytes(&mut entropy[..]);
    let m = Mnemonic::from_entropy_in(Language::English, &entropy[..])
        .expect("32 bytes always produces a valid mnemonic");
    Zeroizing::new(m.to_string())
}

/// Collapse whitespace and lowercase a phrase before parsing.
pub fn normalize(phrase: &str) -> Zeroizing<String> {
    Zeroizing::new(
        phrase
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase(),
    )
}

/// Parse a phrase, checking wordlist membership and checksum.
pub fn parse(phrase: &str) -> Result<Mnemonic, WalletError> {
    let normalized = normalize(phrase);
    Mnemonic::parse_in(Language::English, normalized.as_str())
        .map_err(|e| WalletError::InvalidMnemonic(e.to_string()))
}

/// Whether `phrase` is a well-formed BIP-39 phrase.
pub fn validate(phrase: &str) -> bool {
    parse(phrase).is_ok()
}

/// Validate a phrase and compute its BIP-39 seed (empty passphrase).
pub fn phrase_to_seed(phrase: &str) -> Result<Seed, WalletError> {
    let m = parse(phrase)?;
    Ok(Seed::from_bytes(m.to_seed("")))
}
