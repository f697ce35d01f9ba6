//! Wallet entity
//!
//! The wallet record held by the key custody store: mnemonic phrase (when the
//! wallet came from one), checksummed address, and hex private key.

use crate::shared::types::Address;
use zeroize::Zeroize;

/// Resident wallet record
/// Not serializable; Debug output omits the mnemonic and private key
#[derive(Clone, PartialEq, Eq)]
pub struct WalletRecord {
    mnemonic_phrase: Option<String>,
    address: Address,
    private_key: String,
}

impl WalletRecord {
    pub fn new(mnemonic_phrase: Option<String>, address: Address, private_key: String) -> Self {
        Self {
            mnemonic_phrase,
            address,
            private_key,
        }
    }

    /// The BIP-39 phrase, absent for wallets imported from a raw key
    pub fn mnemonic_phrase(&self) -> Option<&str> {
        self.mnemonic_phrase.as_deref()
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    /// `0x`-prefixed lowercase hex
    pub fn private_key(&self) -> &str {
        &self.private_key
    }

    pub fn has_mnemonic(&self) -> bool {
        self.mnemonic_phrase.is_some()
    }
}

impl Zeroize for WalletRecord {
    fn zeroize(&mut self) {
        self.mnemonic_phrase.zeroize();
        self.private_key.zeroize();
    }
}

impl Drop for WalletRecord {
    fn drop(&mut self) {
        self.zeroize();
    }
}

impl std::fmt::Debug for WalletRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WalletRecord")
            .field("address", &self.address)
            .field("has_mnemonic", &self.has_mnemonic())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wallet_record_accessors() {
        let record = WalletRecord::new(
            Some("test test test test test test test test test test test junk".to_string()),
            "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266".to_string(),
            "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80".to_string(),
        );

        assert_eq!(record.address(), "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266");
        assert!(record.has_mnemonic());
        assert!(record.private_key().starts_with("0xac09"));
    }

    #[test]
    fn test_debug_hides_secrets() {
        let record = WalletRecord::new(
            Some("test test test test test test test test test test test junk".to_string()),
            "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266".to_string(),
            "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80".to_string(),
        );

        let printed = format!("{:?}", record);
        assert!(printed.contains("0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266"));
        assert!(!printed.contains("ac0974"));
        assert!(!printed.contains("junk"));
    }
}
