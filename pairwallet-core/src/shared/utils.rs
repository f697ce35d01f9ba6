//! Utility functions for the wallet core
//!
//! This module contains common utility functions used throughout the wallet core.

use crate::shared::constants::{ADDRESS_SIZE, PRIVATE_KEY_SIZE};
use crate::shared::error::WalletError;
use crate::shared::types::WalletResult;
use ethers::types::{Address as EthAddress, U256};
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use zeroize::Zeroizing;

/// Keccak256 hash function
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    use sha3::{Digest, Keccak256};
    let mut hasher = Keccak256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Format 20 address bytes as an EIP-55 checksummed string
pub fn checksum_address(address_bytes: &[u8]) -> Result<String, WalletError> {
    if address_bytes.len() != ADDRESS_SIZE {
        return Err(WalletError::validation("Address must be 20 bytes"));
    }
    let address = EthAddress::from_slice(address_bytes);
    Ok(ethers::utils::to_checksum(&address, None))
}

/// Validate Ethereum address format
///
/// All-lowercase and all-uppercase addresses are accepted as-is; mixed-case
/// addresses must carry a correct EIP-55 checksum.
pub fn validate_ethereum_address(address: &str) -> Result<(), WalletError> {
    if !address.starts_with("0x") {
        return Err(WalletError::validation("Address must start with 0x"));
    }

    if address.len() != 42 {
        return Err(WalletError::validation("Address must be 42 characters long"));
    }

    let body = &address[2..];
    if !body.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(WalletError::validation("Address contains invalid hex characters"));
    }

    let has_lower = body.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = body.chars().any(|c| c.is_ascii_uppercase());
    if has_lower && has_upper {
        let bytes = hex::decode(body)?;
        if checksum_address(&bytes)? != address {
            return Err(WalletError::validation("Address checksum mismatch"));
        }
    }

    Ok(())
}

/// Validate a raw private key and return its 32 bytes
///
/// Accepts 64 hex digits with or without a `0x` prefix. The scalar must be a
/// valid secp256k1 secret (non-zero and below the curve order).
pub fn parse_private_key(private_key: &str) -> Result<Zeroizing<[u8; PRIVATE_KEY_SIZE]>, WalletError> {
    let clean = private_key.trim();
    let clean = clean.strip_prefix("0x").unwrap_or(clean);

    if clean.len() != PRIVATE_KEY_SIZE * 2 {
        return Err(WalletError::validation("Private key must be 64 hex characters"));
    }

    if !clean.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(WalletError::validation("Private key contains invalid hex characters"));
    }

    let mut key = Zeroizing::new([0u8; PRIVATE_KEY_SIZE]);
    hex::decode_to_slice(clean, &mut key[..])?;

    secp256k1::SecretKey::from_byte_array(*key)
        .map_err(|_| WalletError::validation("Private key is not a valid secp256k1 scalar"))?;

    Ok(key)
}

/// Lowercase and collapse runs of whitespace so pasted phrases parse consistently
pub fn normalize_phrase(phrase: &str) -> String {
    phrase
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Parse a JSON-RPC hex quantity (`0x1bc16d674ec80000`)
pub fn parse_quantity(quantity: &str) -> Result<U256, WalletError> {
    let clean = quantity.trim_start_matches("0x");
    if clean.is_empty() {
        return Ok(U256::zero());
    }
    U256::from_str_radix(clean, 16)
        .map_err(|_| WalletError::network(format!("Invalid hex quantity: {}", quantity)))
}

/// Parse a JSON-RPC hex quantity that must fit in 64 bits
pub fn parse_quantity_u64(quantity: &str) -> Result<u64, WalletError> {
    let value = parse_quantity(quantity)?;
    if value > U256::from(u64::MAX) {
        return Err(WalletError::network(format!("Quantity out of range: {}", quantity)));
    }
    Ok(value.as_u64())
}

/// Parse a strictly positive decimal amount in base units (wei)
pub fn parse_amount_wei(amount: &str) -> Result<U256, WalletError> {
    let amount = amount.trim();
    if amount.is_empty() {
        return Err(WalletError::validation("Amount cannot be empty"));
    }
    if !amount.chars().all(|c| c.is_ascii_digit()) {
        return Err(WalletError::validation("Amount must be a whole number of wei"));
    }
    let value = U256::from_dec_str(amount)
        .map_err(|_| WalletError::validation("Amount is out of range"))?;
    if value.is_zero() {
        return Err(WalletError::validation("Amount must be greater than zero"));
    }
    Ok(value)
}

/// Parse an ether-denominated decimal string into wei
pub fn parse_ether(amount: &str) -> Result<U256, WalletError> {
    let amount = amount.trim();
    if amount.is_empty() {
        return Err(WalletError::validation("Amount cannot be empty"));
    }
    if amount.starts_with('-') {
        return Err(WalletError::validation("Amount cannot be negative"));
    }
    ethers::utils::parse_ether(amount)
        .map_err(|e| WalletError::validation(format!("Invalid ether amount: {}", e)))
}

/// Format wei as an ether-denominated decimal string
pub fn format_ether(wei: U256) -> String {
    ethers::utils::format_ether(wei)
}

/// Run a network-bound future under a deadline and an optional cancellation token
pub async fn run_bounded<F, T>(
    operation: &str,
    limit: Duration,
    cancel: Option<&CancellationToken>,
    future: F,
) -> WalletResult<T>
where
    F: Future<Output = WalletResult<T>>,
{
    let timed = tokio::time::timeout(limit, future);
    let outcome = match cancel {
        Some(token) => {
            tokio::select! {
                biased;
                _ = token.cancelled() => return Err(WalletError::cancelled(operation)),
                outcome = timed => outcome,
            }
        }
        None => timed.await,
    };
    match outcome {
        Ok(result) => result,
        Err(_) => Err(WalletError::timeout(format!("{} exceeded {} ms", operation, limit.as_millis()))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_validate_ethereum_address() {
        // Valid addresses
        assert!(validate_ethereum_address("0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266").is_ok());
        assert!(validate_ethereum_address("0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266").is_ok());

        // Invalid addresses
        assert!(validate_ethereum_address("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266").is_err()); // No 0x
        assert!(validate_ethereum_address("0xf39Fd6e51aad88F6F4ce6aB8827279cffFb9226").is_err()); // Too short
        assert!(validate_ethereum_address("0xf39Fd6e51aad88F6F4ce6aB8827279cffFb9226g").is_err()); // Invalid char
        assert!(validate_ethereum_address("0xF39Fd6e51aad88F6F4ce6aB8827279cffFb92266").is_err()); // Bad checksum
        assert!(validate_ethereum_address("").is_err());
    }

    #[test]
    fn test_parse_private_key() {
        let key = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
        assert!(parse_private_key(key).is_ok());
        assert!(parse_private_key(&key[2..]).is_ok());

        // Wrong length, non-hex, zero scalar, above curve order
        assert!(parse_private_key("0x1234").is_err());
        assert!(parse_private_key(&format!("0x{}", "zz".repeat(32))).is_err());
        assert!(parse_private_key(&format!("0x{}", "00".repeat(32))).is_err());
        assert!(parse_private_key(&format!("0x{}", "ff".repeat(32))).is_err());
    }

    #[test]
    fn test_normalize_phrase() {
        assert_eq!(normalize_phrase("  test\tTest \n JUNK "), "test test junk");
    }

    #[test]
    fn test_parse_quantity() {
        assert_eq!(parse_quantity("0x1bc16d674ec80000").expect("quantity"), U256::exp10(18) * U256::from(2u64));
        assert_eq!(parse_quantity("0x0").expect("quantity"), U256::zero());
        assert_eq!(parse_quantity_u64("0x5208").expect("quantity"), 21000);
        assert!(parse_quantity("0xnothex").is_err());
    }

    #[test]
    fn test_parse_amount_wei() {
        assert_eq!(parse_amount_wei("1000").expect("amount"), U256::from(1000u64));
        assert!(parse_amount_wei("0").is_err());
        assert!(parse_amount_wei("").is_err());
        assert!(parse_amount_wei("-5").is_err());
        assert!(parse_amount_wei("1.5").is_err());
    }

    #[test]
    fn test_ether_conversion() {
        let wei = parse_ether("0.01").expect("ether");
        assert_eq!(wei, U256::exp10(16));
        assert!(format_ether(wei).starts_with("0.01"));
        assert!(parse_ether("abc").is_err());
        assert!(parse_ether("-1").is_err());
    }

    #[tokio::test]
    async fn test_run_bounded_times_out() {
        let result: WalletResult<()> = run_bounded("slow_call", Duration::from_millis(10), None, async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        })
        .await;
        assert!(matches!(result, Err(WalletError::Timeout(_))));
    }

    #[tokio::test]
    async fn test_run_bounded_cancelled() {
        let token = CancellationToken::new();
        token.cancel();
        let result: WalletResult<()> = run_bounded("pair", Duration::from_secs(5), Some(&token), async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        })
        .await;
        assert!(matches!(result, Err(WalletError::Cancelled(_))));
    }

    #[tokio::test]
    async fn test_run_bounded_passes_result_through() {
        let result = run_bounded("fast_call", Duration::from_secs(1), None, async { Ok(7u8) }).await;
        assert_eq!(result, Ok(7));
    }

    proptest! {
        #[test]
        fn checksummed_addresses_always_validate(bytes in proptest::collection::vec(any::<u8>(), 20)) {
            let address = checksum_address(&bytes).expect("20 bytes");
            prop_assert!(validate_ethereum_address(&address).is_ok());
            prop_assert!(validate_ethereum_address(&address.to_lowercase()).is_ok());
        }

        #[test]
        fn non_positive_or_garbage_amounts_rejected(s in "[-a-z. ]{0,12}") {
            prop_assert!(parse_amount_wei(&s).is_err());
        }
    }
}
