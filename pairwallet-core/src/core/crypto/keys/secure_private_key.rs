use crate::shared::constants::PRIVATE_KEY_SIZE;
use crate::shared::error::WalletError;
use crate::shared::utils::parse_private_key;
use secp256k1::SecretKey;
use zeroize::Zeroizing;

/// secp256k1 private key held in self-zeroizing memory
///
/// The raw bytes only leave as a [`SecretKey`] or a zeroizing hex string.
pub struct SecurePrivateKey {
    bytes: Zeroizing<[u8; PRIVATE_KEY_SIZE]>,
}

impl SecurePrivateKey {
    /// Wrap raw key bytes, rejecting values outside the curve order
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, WalletError> {
        let array: [u8; PRIVATE_KEY_SIZE] = bytes
            .try_into()
            .map_err(|_| WalletError::crypto("Invalid private key length"))?;
        let bytes = Zeroizing::new(array);
        SecretKey::from_byte_array(*bytes)
            .map_err(|_| WalletError::crypto("Invalid private key"))?;
        Ok(Self { bytes })
    }

    /// Parse a 64-digit hex key, `0x` prefix optional
    pub fn from_hex(private_key: &str) -> Result<Self, WalletError> {
        Ok(Self { bytes: parse_private_key(private_key)? })
    }

    pub fn secret_key(&self) -> Result<SecretKey, WalletError> {
        Ok(SecretKey::from_byte_array(*self.bytes)?)
    }

    /// `0x`-prefixed lowercase hex, zeroized on drop
    pub fn to_hex(&self) -> Zeroizing<String> {
        Zeroizing::new(format!("0x{}", hex::encode(*self.bytes)))
    }
}

// No Debug or Clone, to keep key bytes out of logs and stray copies
