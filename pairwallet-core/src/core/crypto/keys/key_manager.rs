//! Key generation and derivation
//!
//! Mnemonic generation, BIP-32 derivation along the standard Ethereum path,
//! and address computation for secp256k1 keys.

use super::{SecurePrivateKey, SecureSeedPhrase};
use crate::shared::constants::{ETH_DERIVATION_PATH, MNEMONIC_ENTROPY_SIZE, PUBLIC_KEY_SIZE};
use crate::shared::error::WalletError;
use crate::shared::utils::{checksum_address, keccak256};
use bip32::{DerivationPath, XPrv};
use rand_core::{OsRng, RngCore};
use secp256k1::{PublicKey, Secp256k1};
use std::str::FromStr;
use zeroize::Zeroizing;

/// Key manager for cryptographic key operations
pub struct KeyManager {
    secp256k1: Secp256k1<secp256k1::All>,
}

impl KeyManager {
    pub fn new() -> Self {
        Self {
            secp256k1: Secp256k1::new(),
        }
    }

    /// Draw 128 bits of OS entropy and encode them as a 12-word phrase
    pub fn generate_mnemonic(&self) -> Result<SecureSeedPhrase, WalletError> {
        let mut entropy = Zeroizing::new([0u8; MNEMONIC_ENTROPY_SIZE]);
        OsRng.fill_bytes(&mut *entropy);
        SecureSeedPhrase::from_entropy(&*entropy)
    }

    /// Derive the account key at `m/44'/60'/0'/0/0`
    pub fn derive_private_key(&self, seed_phrase: &SecureSeedPhrase) -> Result<SecurePrivateKey, WalletError> {
        let seed = seed_phrase.to_seed()?;

        let xprv = XPrv::new(&*seed)
            .map_err(|e| WalletError::crypto(format!("Failed to create XPrv: {}", e)))?;

        let derivation_path = DerivationPath::from_str(ETH_DERIVATION_PATH)
            .map_err(|e| WalletError::crypto(format!("Invalid derivation path: {}", e)))?;

        let mut child_xprv = xprv;
        for child_number in derivation_path.into_iter() {
            child_xprv = child_xprv.derive_child(child_number)
                .map_err(|e| WalletError::crypto(format!("Failed to derive child XPrv: {}", e)))?;
        }

        let private_key_bytes = Zeroizing::new(child_xprv.private_key().to_bytes());
        SecurePrivateKey::from_bytes(private_key_bytes.as_slice())
    }

    pub fn public_key(&self, private_key: &SecurePrivateKey) -> Result<PublicKey, WalletError> {
        let secret_key = private_key.secret_key()?;
        Ok(PublicKey::from_secret_key(&self.secp256k1, &secret_key))
    }

    /// EIP-55 checksummed address of a private key
    pub fn address(&self, private_key: &SecurePrivateKey) -> Result<String, WalletError> {
        let public_key = self.public_key(private_key)?;
        Self::address_from_uncompressed(&public_key.serialize_uncompressed())
    }

    fn address_from_uncompressed(public_key: &[u8; PUBLIC_KEY_SIZE]) -> Result<String, WalletError> {
        // Skip the 0x04 prefix; the address is the last 20 bytes of the hash
        let keccak_hash = keccak256(&public_key[1..]);
        checksum_address(&keccak_hash[12..])
    }
}

impl Default for KeyManager {
    fn default() -> Self {
        Self::new()
    }
}
