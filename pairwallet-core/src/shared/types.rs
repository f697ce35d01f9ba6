use serde::{Deserialize, Serialize};

// Basic types for wallet operations
pub type Address = String;
pub type GasLimit = u64;
/// Decimal string in base units (wei)
pub type Amount = String;
pub type Balance = String;

/// Chain identity as reported by the endpoint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NetworkInfo {
    pub name: String,
    pub chain_id: u64,
}

// Transaction types
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub to: Address,
    pub value: Amount,
    pub data: Option<Vec<u8>>,
    pub gas_limit: Option<GasLimit>,
    pub gas_price: Option<u64>,
    pub nonce: Option<u64>,
    pub chain_id: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignedTransaction {
    pub transaction: Transaction,
    /// RLP-encoded raw transaction
    pub raw: Vec<u8>,
    pub hash: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TransactionStatus {
    Confirmed,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TransactionReceipt {
    pub hash: String,
    pub status: TransactionStatus,
    pub block_number: Option<u64>,
    pub gas_used: Option<GasLimit>,
}

/// Dashboard summary of the resident wallet
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WalletDetails {
    pub address: Address,
    pub balance_wei: Balance,
    pub balance_ether: String,
    pub network_name: String,
}

/// Human-readable notification shown to the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub title: String,
    pub message: String,
}

impl Notice {
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
        }
    }
}

// Result types for better error handling
pub type WalletResult<T> = Result<T, crate::shared::error::WalletError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transaction_creation() {
        let transaction = Transaction {
            to: "0x1234".to_string(),
            value: "1000000000000000000".to_string(),
            data: None,
            gas_limit: None,
            gas_price: None,
            nonce: None,
            chain_id: 11155111,
        };

        assert_eq!(transaction.to, "0x1234");
        assert_eq!(transaction.value, "1000000000000000000");
        assert_eq!(transaction.chain_id, 11155111);
    }

    #[test]
    fn test_notice_creation() {
        let notice = Notice::new("Wallet Created", "Address: 0xabc");
        assert_eq!(notice.title, "Wallet Created");
        assert_eq!(notice.message, "Address: 0xabc");
    }
}
