//! Key custody for the wallet core
//!
//! Creates and imports the single resident wallet and persists it in the
//! platform key-value store under `mnemonic`, `walletAddress` and `privateKey`.

use crate::core::crypto::keys::{KeyManager, SecurePrivateKey, SecureSeedPhrase};
use crate::domain::entities::WalletRecord;
use crate::infrastructure::platform::PlatformStorage;
use crate::shared::constants::{ADDRESS_STORAGE_KEY, MNEMONIC_STORAGE_KEY, PRIVATE_KEY_STORAGE_KEY};
use crate::shared::error::WalletError;
use crate::shared::utils::normalize_phrase;
use std::sync::Arc;
use zeroize::Zeroizing;

/// Owner of the resident wallet record
pub struct KeyCustody {
    storage: Arc<dyn PlatformStorage>,
    key_manager: KeyManager,
}

/// What an import string turned out to be
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportKind {
    Mnemonic,
    PrivateKey,
}

impl KeyCustody {
    pub fn new(storage: Arc<dyn PlatformStorage>) -> Self {
        Self {
            storage,
            key_manager: KeyManager::new(),
        }
    }

    /// Create a fresh wallet from OS entropy and make it resident
    pub fn generate(&self) -> Result<WalletRecord, WalletError> {
        let phrase = self.key_manager.generate_mnemonic()?;
        let record = self.record_from_phrase(&phrase)?;
        self.persist(&record)?;
        log::info!("Generated wallet {}", record.address());
        Ok(record)
    }

    /// Import a mnemonic phrase or a raw hex private key and make it resident
    pub fn import_from(&self, input: &str) -> Result<WalletRecord, WalletError> {
        let record = self.derive(input)?;
        self.persist(&record)?;
        log::info!("Imported wallet {}", record.address());
        Ok(record)
    }

    /// Build the record an import string describes without storing it
    pub fn derive(&self, input: &str) -> Result<WalletRecord, WalletError> {
        let normalized = Zeroizing::new(normalize_phrase(input));
        match Self::classify(&normalized)? {
            ImportKind::Mnemonic => {
                let phrase = SecureSeedPhrase::parse(&normalized)?;
                self.record_from_phrase(&phrase)
            }
            ImportKind::PrivateKey => {
                let private_key = SecurePrivateKey::from_hex(&normalized)?;
                let address = self.key_manager.address(&private_key)?;
                Ok(WalletRecord::new(None, address, private_key.to_hex().to_string()))
            }
        }
    }

    /// The resident wallet, `None` when nothing has been created or imported
    pub fn current(&self) -> Result<Option<WalletRecord>, WalletError> {
        let address = self.storage.retrieve(ADDRESS_STORAGE_KEY)?;
        let private_key = self.storage.retrieve(PRIVATE_KEY_STORAGE_KEY)?;
        match (address, private_key) {
            (Some(address), Some(private_key)) => {
                let mnemonic = self.storage.retrieve(MNEMONIC_STORAGE_KEY)?;
                Ok(Some(WalletRecord::new(mnemonic, address, private_key)))
            }
            (None, None) => Ok(None),
            _ => Err(WalletError::storage("Wallet record is incomplete")),
        }
    }

    /// The resident wallet, or `WalletNotFound`
    pub fn require_current(&self) -> Result<WalletRecord, WalletError> {
        self.current()?
            .ok_or_else(|| WalletError::wallet_not_found("No wallet has been created or imported"))
    }

    /// Decide how to interpret normalized import input
    pub fn classify(normalized: &str) -> Result<ImportKind, WalletError> {
        if normalized.is_empty() {
            return Err(WalletError::validation("Enter a seed phrase or a private key"));
        }
        if normalized.contains(' ') {
            Ok(ImportKind::Mnemonic)
        } else {
            Ok(ImportKind::PrivateKey)
        }
    }

    fn record_from_phrase(&self, phrase: &SecureSeedPhrase) -> Result<WalletRecord, WalletError> {
        let private_key = self.key_manager.derive_private_key(phrase)?;
        let address = self.key_manager.address(&private_key)?;
        Ok(WalletRecord::new(
            Some(phrase.as_str().to_string()),
            address,
            private_key.to_hex().to_string(),
        ))
    }

    /// Make `record` the resident wallet, replacing any previous one
    pub fn persist(&self, record: &WalletRecord) -> Result<(), WalletError> {
        match record.mnemonic_phrase() {
            Some(phrase) => self.storage.store(MNEMONIC_STORAGE_KEY, phrase)?,
            None => self.storage.delete(MNEMONIC_STORAGE_KEY)?,
        }
        self.storage.store(ADDRESS_STORAGE_KEY, record.address())?;
        self.storage.store(PRIVATE_KEY_STORAGE_KEY, record.private_key())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    const TEST_MNEMONIC: &str = "test test test test test test test test test test test junk";
    const TEST_ADDRESS: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";
    const TEST_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    // Mock storage for tests
    struct MockStorage {
        data: Mutex<HashMap<String, String>>,
    }

    impl MockStorage {
        fn new() -> Self {
            Self {
                data: Mutex::new(HashMap::new()),
            }
        }

        fn get(&self, key: &str) -> Option<String> {
            self.data.lock().expect("lock").get(key).cloned()
        }
    }

    impl PlatformStorage for MockStorage {
        fn store(&self, key: &str, value: &str) -> Result<(), WalletError> {
            let mut storage = self.data.lock()
                .expect("Failed to acquire lock for storage write");
            storage.insert(key.to_string(), value.to_string());
            Ok(())
        }

        fn retrieve(&self, key: &str) -> Result<Option<String>, WalletError> {
            let storage = self.data.lock()
                .expect("Failed to acquire lock for storage read");
            Ok(storage.get(key).cloned())
        }

        fn delete(&self, key: &str) -> Result<(), WalletError> {
            let mut storage = self.data.lock()
                .expect("Failed to acquire lock for storage delete");
            storage.remove(key);
            Ok(())
        }

        fn list_keys(&self) -> Result<Vec<String>, WalletError> {
            let storage = self.data.lock()
                .expect("Failed to acquire lock for storage list");
            Ok(storage.keys().cloned().collect())
        }
    }

    #[test]
    fn test_import_known_mnemonic() {
        let storage = Arc::new(MockStorage::new());
        let custody = KeyCustody::new(storage.clone());

        let record = custody.import_from(TEST_MNEMONIC).expect("Failed to import mnemonic");
        assert_eq!(record.address(), TEST_ADDRESS);
        assert_eq!(record.private_key(), TEST_KEY);
        assert_eq!(record.mnemonic_phrase(), Some(TEST_MNEMONIC));

        assert_eq!(storage.get("mnemonic").as_deref(), Some(TEST_MNEMONIC));
        assert_eq!(storage.get("walletAddress").as_deref(), Some(TEST_ADDRESS));
        assert_eq!(storage.get("privateKey").as_deref(), Some(TEST_KEY));
    }

    #[test]
    fn test_derive_does_not_store() {
        let storage = Arc::new(MockStorage::new());
        let custody = KeyCustody::new(storage.clone());

        let record = custody.derive(TEST_MNEMONIC).expect("Failed to derive wallet");
        assert_eq!(record.address(), TEST_ADDRESS);
        assert_eq!(custody.current().expect("load"), None);
        assert!(storage.list_keys().expect("list").is_empty());

        custody.persist(&record).expect("Failed to persist wallet");
        assert_eq!(custody.current().expect("load"), Some(record));
    }

    #[test]
    fn test_import_is_deterministic_and_whitespace_tolerant() {
        let custody = KeyCustody::new(Arc::new(MockStorage::new()));
        let first = custody.import_from(TEST_MNEMONIC).expect("import");
        let second = custody
            .import_from("\n  test test test test test test\ttest test test test test junk  ")
            .expect("import");
        assert_eq!(first, second);
    }

    #[test]
    fn test_generate_then_reimport() {
        let custody = KeyCustody::new(Arc::new(MockStorage::new()));
        let generated = custody.generate().expect("Failed to generate wallet");
        let phrase = generated.mnemonic_phrase().expect("generated wallets carry a phrase").to_string();
        assert_eq!(phrase.split(' ').count(), 12);

        let other = KeyCustody::new(Arc::new(MockStorage::new()));
        let imported = other.import_from(&phrase).expect("Failed to re-import");
        assert_eq!(imported.address(), generated.address());
    }

    #[test]
    fn test_import_private_key_clears_mnemonic() {
        let storage = Arc::new(MockStorage::new());
        let custody = KeyCustody::new(storage.clone());
        custody.generate().expect("generate");
        assert!(storage.get("mnemonic").is_some());

        let record = custody.import_from(TEST_KEY).expect("Failed to import private key");
        assert_eq!(record.address(), TEST_ADDRESS);
        assert!(!record.has_mnemonic());
        assert_eq!(storage.get("mnemonic"), None);

        let current = custody.current().expect("load").expect("resident wallet");
        assert_eq!(current, record);
    }

    #[test]
    fn test_import_rejects_invalid_input() {
        let custody = KeyCustody::new(Arc::new(MockStorage::new()));
        let zero_key = format!("0x{}", "0".repeat(64));
        let curve_order = "0xfffffffffffffffffffffffffffffffebaaedce6af48a03bbfd25e8cd0364141";
        for input in [
            "",
            "   ",
            "0x1234",
            zero_key.as_str(),
            curve_order,
            "0xzz0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80",
            "test test test test test test test test test test test test",
        ] {
            let result = custody.import_from(input);
            assert!(matches!(result, Err(WalletError::Validation(_))), "input {:?} gave {:?}", input, result);
        }
        assert_eq!(custody.current().expect("load"), None);
    }

    #[test]
    fn test_current_detects_partial_record() {
        let storage = Arc::new(MockStorage::new());
        storage.store("walletAddress", TEST_ADDRESS).expect("store");
        let custody = KeyCustody::new(storage);
        assert!(matches!(custody.current(), Err(WalletError::Storage(_))));
        assert!(custody.require_current().is_err());
    }
}
