use crate::core::crypto::keys::SecurePrivateKey;
use crate::shared::error::WalletError;
use crate::shared::types::{SignedTransaction, Transaction};
use crate::shared::utils::keccak256;
use crate::shared::WalletResult;
use ethers::types::U256;
use rlp::RlpStream;
use secp256k1::ecdsa::{RecoverableSignature, RecoveryId};
use secp256k1::{Message, Secp256k1};

/// Digital signature manager
pub struct SignatureManager {
    secp: Secp256k1<secp256k1::All>,
}

impl SignatureManager {
    pub fn new() -> Self {
        Self {
            secp: Secp256k1::new(),
        }
    }

    /// Calculate the v value for Ethereum signatures
    fn calculate_v_eip155(&self, rec_id: RecoveryId, chain_id: u64) -> u64 {
        let rec_num: i32 = i32::from(rec_id);
        (rec_num as u64) + 35 + 2 * chain_id
    }

    fn u256_to_bytes_be(val: U256) -> Vec<u8> {
        if val.is_zero() {
            return Vec::new();
        }
        let mut buf = [0u8; 32];
        val.to_big_endian(&mut buf);
        trim_leading_zeros(&buf)
    }

    /// RLP list of the nine legacy fields; the last three are either the
    /// EIP-155 `(chain_id, 0, 0)` placeholder or the actual `(v, r, s)`
    fn encode_legacy(fields: &LegacyFields, tail: (u64, Vec<u8>, Vec<u8>)) -> Vec<u8> {
        let mut s = RlpStream::new_list(9);
        s.append(&fields.nonce);
        s.append(&fields.gas_price);
        s.append(&fields.gas_limit);
        if fields.to.is_empty() {
            s.append_empty_data();
        } else {
            s.append(&fields.to);
        }
        s.append(&fields.value);
        s.append(&fields.data);
        s.append(&tail.0);
        s.append(&tail.1);
        s.append(&tail.2);
        s.out().to_vec()
    }

    /// Sign a legacy (pre-1559) Ethereum transaction with EIP-155 replay protection
    pub fn sign_legacy_raw(&self, tx: &Transaction, private_key: &SecurePrivateKey) -> WalletResult<SignedTransaction> {
        let nonce = tx.nonce.ok_or_else(|| WalletError::validation("Missing nonce"))?;
        let gas_price = tx.gas_price.ok_or_else(|| WalletError::validation("Missing gas price"))?;
        let gas_limit = tx.gas_limit.ok_or_else(|| WalletError::validation("Missing gas limit"))?;

        let to = if tx.to.is_empty() {
            Vec::new()
        } else {
            hex::decode(tx.to.trim_start_matches("0x")).map_err(|_| WalletError::validation("Invalid to address"))?
        };
        let value = U256::from_dec_str(&tx.value).map_err(|_| WalletError::validation("Invalid value"))?;
        let fields = LegacyFields {
            nonce,
            gas_price,
            gas_limit,
            to,
            value: Self::u256_to_bytes_be(value),
            data: tx.data.clone().unwrap_or_default(),
        };

        let signing_rlp = Self::encode_legacy(&fields, (tx.chain_id, Vec::new(), Vec::new()));
        let msg = Message::from_digest(keccak256(&signing_rlp));

        let rec_sig: RecoverableSignature = self.secp.sign_ecdsa_recoverable(msg, &private_key.secret_key()?);
        let (rec_id, compact) = rec_sig.serialize_compact();
        let v = self.calculate_v_eip155(rec_id, tx.chain_id);
        let r = trim_leading_zeros(&compact[0..32]);
        let s = trim_leading_zeros(&compact[32..64]);

        let raw = Self::encode_legacy(&fields, (v, r, s));
        let hash = format!("0x{}", hex::encode(keccak256(&raw)));
        Ok(SignedTransaction {
            transaction: tx.clone(),
            raw,
            hash,
        })
    }
}

impl Default for SignatureManager {
    fn default() -> Self {
        Self::new()
    }
}

struct LegacyFields {
    nonce: u64,
    gas_price: u64,
    gas_limit: u64,
    to: Vec<u8>,
    value: Vec<u8>,
    data: Vec<u8>,
}

fn trim_leading_zeros(bytes: &[u8]) -> Vec<u8> {
    let first_non_zero = bytes.iter().position(|&b| b != 0).unwrap_or(bytes.len());
    bytes[first_non_zero..].to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    #[test]
    fn test_eip155_reference_vector() {
        // Example transaction from EIP-155
        let private_key = SecurePrivateKey::from_hex(
            "4646464646464646464646464646464646464646464646464646464646464646",
        ).expect("Failed to parse key");
        let tx = Transaction {
            to: "0x3535353535353535353535353535353535353535".to_string(),
            value: "1000000000000000000".to_string(),
            data: None,
            gas_limit: Some(21000),
            gas_price: Some(20_000_000_000),
            nonce: Some(9),
            chain_id: 1,
        };

        let signed = SignatureManager::new().sign_legacy_raw(&tx, &private_key)
            .expect("Failed to sign transaction");
        assert_eq!(
            hex::encode(&signed.raw),
            "f86c098504a817c800825208943535353535353535353535353535353535353535880de0b6b3a76400008025a028ef61340bd939bc2195fe537567866003e1a15d3c71ff63e1590620aa636276a067cbe9d8997f761aecb703304b3800ccf555c9f3dc64214b297fb1966a3b6d83"
        );
        assert_eq!(signed.hash, format!("0x{}", hex::encode(keccak256(&signed.raw))));
    }

    #[test]
    fn test_sign_requires_gas_fields() {
        let private_key = SecurePrivateKey::from_hex(TEST_KEY).expect("Failed to parse key");
        let tx = Transaction {
            to: "0x3535353535353535353535353535353535353535".to_string(),
            value: "1".to_string(),
            data: None,
            gas_limit: None,
            gas_price: Some(1),
            nonce: Some(0),
            chain_id: 11155111,
        };
        let result = SignatureManager::new().sign_legacy_raw(&tx, &private_key);
        assert!(matches!(result, Err(WalletError::Validation(_))));
    }
}
