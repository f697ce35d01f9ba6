//! Chain access port
//!
//! Read and broadcast operations against an EVM JSON-RPC endpoint.

use crate::shared::error::WalletError;
use crate::shared::types::TransactionReceipt;
use async_trait::async_trait;
use ethers::types::U256;

/// EVM chain client
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Native balance of `address` at the latest block, in wei
    async fn get_balance(&self, address: &str) -> Result<U256, WalletError>;

    /// Chain id reported by the endpoint
    async fn chain_id(&self) -> Result<u64, WalletError>;

    /// Pending nonce for `address`
    async fn transaction_count(&self, address: &str) -> Result<u64, WalletError>;

    async fn gas_price(&self) -> Result<U256, WalletError>;

    /// Gas estimate for a plain value transfer
    async fn estimate_gas(&self, from: &str, to: &str, value: U256) -> Result<u64, WalletError>;

    /// Broadcast a signed RLP transaction, returning its hash
    async fn send_raw_transaction(&self, raw: &[u8]) -> Result<String, WalletError>;

    /// Receipt for `hash`, `None` while still pending
    async fn transaction_receipt(&self, hash: &str) -> Result<Option<TransactionReceipt>, WalletError>;
}
