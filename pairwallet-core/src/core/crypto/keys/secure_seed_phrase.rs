use crate::shared::error::WalletError;
use crate::shared::utils::normalize_phrase;
use bip39::{Language, Mnemonic};
use zeroize::{Zeroize, Zeroizing};

/// Validated BIP-39 English phrase, zeroized on drop
pub struct SecureSeedPhrase {
    phrase: String,
}

impl SecureSeedPhrase {
    /// Parse and normalize a phrase; fails on unknown words or a bad checksum
    pub fn parse(phrase: &str) -> Result<Self, WalletError> {
        let normalized = Zeroizing::new(normalize_phrase(phrase));
        if normalized.is_empty() {
            return Err(WalletError::validation("Seed phrase cannot be empty"));
        }
        Mnemonic::parse_in_normalized(Language::English, &normalized)
            .map_err(|e| WalletError::validation(format!("Invalid BIP39 seed phrase: {}", e)))?;
        Ok(Self { phrase: normalized.to_string() })
    }

    /// Phrase for freshly drawn entropy
    pub fn from_entropy(entropy: &[u8]) -> Result<Self, WalletError> {
        let mnemonic = Mnemonic::from_entropy(entropy)?;
        Ok(Self { phrase: mnemonic.to_string() })
    }

    pub fn as_str(&self) -> &str {
        &self.phrase
    }

    pub fn word_count(&self) -> usize {
        self.phrase.split_whitespace().count()
    }

    /// BIP-39 seed with an empty passphrase
    pub fn to_seed(&self) -> Result<Zeroizing<[u8; 64]>, WalletError> {
        let mnemonic = Mnemonic::parse_in_normalized(Language::English, &self.phrase)?;
        Ok(Zeroizing::new(mnemonic.to_seed_normalized("")))
    }
}

impl Drop for SecureSeedPhrase {
    fn drop(&mut self) {
        self.phrase.zeroize();
    }
}
