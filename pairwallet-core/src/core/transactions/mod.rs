//! Transaction processing functionality
//!
//! Balance and network queries, plus value transfers: validate, fill in
//! nonce and gas from the chain, sign, broadcast and wait for the receipt.
//! Every chain call is bounded by a timeout and an optional cancellation token.

use crate::core::crypto::keys::{KeyManager, SecurePrivateKey};
use crate::core::crypto::signatures::SignatureManager;
use crate::domain::entities::WalletRecord;
use crate::domain::repositories::ChainClient;
use crate::shared::constants::{DEFAULT_GAS_LIMIT, KNOWN_CHAINS, RECEIPT_POLL_INTERVAL_MS};
use crate::shared::error::WalletError;
use crate::shared::types::{NetworkInfo, Transaction, TransactionReceipt, TransactionStatus, WalletDetails};
use crate::shared::utils::{format_ether, parse_amount_wei, run_bounded, validate_ethereum_address};
use ethers::types::U256;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Transaction manager for handling blockchain transactions
pub struct TransactionManager {
    chain: Arc<dyn ChainClient>,
    signature_manager: SignatureManager,
    network_timeout: Duration,
    confirmation_timeout: Duration,
    poll_interval: Duration,
}

impl TransactionManager {
    pub fn new(chain: Arc<dyn ChainClient>, network_timeout: Duration, confirmation_timeout: Duration) -> Self {
        Self {
            chain,
            signature_manager: SignatureManager::new(),
            network_timeout,
            confirmation_timeout,
            poll_interval: Duration::from_millis(RECEIPT_POLL_INTERVAL_MS),
        }
    }

    /// Override the receipt polling interval
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Native balance in wei
    pub async fn get_balance(&self, address: &str, cancel: Option<&CancellationToken>) -> Result<U256, WalletError> {
        validate_ethereum_address(address)?;
        run_bounded("eth_getBalance", self.network_timeout, cancel, self.chain.get_balance(address)).await
    }

    /// Chain identity of the configured endpoint
    pub async fn network_info(&self, cancel: Option<&CancellationToken>) -> Result<NetworkInfo, WalletError> {
        let chain_id = run_bounded("eth_chainId", self.network_timeout, cancel, self.chain.chain_id()).await?;
        Ok(NetworkInfo {
            name: chain_name(chain_id),
            chain_id,
        })
    }

    /// Dashboard summary for a wallet
    pub async fn wallet_details(
        &self,
        record: &WalletRecord,
        cancel: Option<&CancellationToken>,
    ) -> Result<WalletDetails, WalletError> {
        let balance = self.get_balance(record.address(), cancel).await?;
        let network = self.network_info(cancel).await?;
        Ok(WalletDetails {
            address: record.address().to_string(),
            balance_wei: balance.to_string(),
            balance_ether: format_ether(balance),
            network_name: network.name,
        })
    }

    /// Transfer `amount_wei` to `to`, signed with `private_key`
    ///
    /// Input is validated before any chain call. Returns once the transaction
    /// is mined; a reverted transaction is a `Transaction` error.
    pub async fn send_transaction(
        &self,
        to: &str,
        amount_wei: &str,
        private_key: &str,
        cancel: Option<&CancellationToken>,
    ) -> Result<TransactionReceipt, WalletError> {
        validate_ethereum_address(to)?;
        let value = parse_amount_wei(amount_wei)?;
        let private_key = SecurePrivateKey::from_hex(private_key)?;
        let from = KeyManager::new().address(&private_key)?;

        let limit = self.network_timeout;
        let chain_id = run_bounded("eth_chainId", limit, cancel, self.chain.chain_id()).await?;
        let nonce = run_bounded("eth_getTransactionCount", limit, cancel, self.chain.transaction_count(&from)).await?;
        let gas_price = run_bounded("eth_gasPrice", limit, cancel, self.chain.gas_price()).await?;
        let gas_limit = match run_bounded("eth_estimateGas", limit, cancel, self.chain.estimate_gas(&from, to, value)).await {
            Ok(estimate) => estimate,
            Err(e @ (WalletError::Timeout(_) | WalletError::Cancelled(_))) => return Err(e),
            Err(e) => {
                log::warn!("Gas estimation failed, using {}: {}", DEFAULT_GAS_LIMIT, e);
                DEFAULT_GAS_LIMIT
            }
        };
        if gas_price > U256::from(u64::MAX) {
            return Err(WalletError::transaction("Gas price out of range"));
        }

        let transaction = Transaction {
            to: to.to_string(),
            value: value.to_string(),
            data: None,
            gas_limit: Some(gas_limit),
            gas_price: Some(gas_price.as_u64()),
            nonce: Some(nonce),
            chain_id,
        };
        let signed = self.signature_manager.sign_legacy_raw(&transaction, &private_key)?;

        let hash = run_bounded("eth_sendRawTransaction", limit, cancel, self.chain.send_raw_transaction(&signed.raw)).await?;
        if !hash.eq_ignore_ascii_case(&signed.hash) {
            log::warn!("Endpoint returned hash {} for locally computed {}", hash, signed.hash);
        }
        log::info!("Broadcast transaction {} from {} to {}", hash, from, to);

        let receipt = self.wait_for_receipt(&hash, cancel).await?;
        if receipt.status == TransactionStatus::Failed {
            return Err(WalletError::transaction(format!("Transaction {} reverted", hash)));
        }
        Ok(receipt)
    }

    /// Poll for a receipt until mined or the confirmation timeout elapses
    pub async fn wait_for_receipt(
        &self,
        hash: &str,
        cancel: Option<&CancellationToken>,
    ) -> Result<TransactionReceipt, WalletError> {
        let poll = async {
            loop {
                let receipt = tokio::time::timeout(self.network_timeout, self.chain.transaction_receipt(hash))
                    .await
                    .map_err(|_| WalletError::timeout("eth_getTransactionReceipt"))??;
                if let Some(receipt) = receipt {
                    return Ok::<TransactionReceipt, WalletError>(receipt);
                }
                tokio::time::sleep(self.poll_interval).await;
            }
        };
        run_bounded("transaction confirmation", self.confirmation_timeout, cancel, poll).await
    }
}

/// Human-readable name for a chain id
pub fn chain_name(chain_id: u64) -> String {
    KNOWN_CHAINS
        .iter()
        .find(|(id, _)| *id == chain_id)
        .map(|(_, name)| name.to_string())
        .unwrap_or_else(|| format!("chain {}", chain_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::MockChainClient;
    use mockall::predicate::eq;

    const TEST_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
    const TEST_ADDRESS: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";
    const RECIPIENT: &str = "0x70997970C51812dc3A010C7d01b50e0d17dc79C8";

    fn manager(chain: MockChainClient) -> TransactionManager {
        TransactionManager::new(Arc::new(chain), Duration::from_secs(5), Duration::from_secs(5))
            .with_poll_interval(Duration::from_millis(10))
    }

    fn untouched_chain() -> MockChainClient {
        let mut chain = MockChainClient::new();
        chain.expect_chain_id().never();
        chain.expect_transaction_count().never();
        chain.expect_gas_price().never();
        chain.expect_estimate_gas().never();
        chain.expect_send_raw_transaction().never();
        chain.expect_transaction_receipt().never();
        chain.expect_get_balance().never();
        chain
    }

    #[tokio::test]
    async fn test_send_rejects_bad_input_before_network() {
        let manager = manager(untouched_chain());

        for (to, amount) in [
            ("0x1234", "1"),
            ("not an address", "1"),
            ("", "1"),
            (RECIPIENT, "0"),
            (RECIPIENT, "-5"),
            (RECIPIENT, ""),
            (RECIPIENT, "1.5"),
        ] {
            let result = manager.send_transaction(to, amount, TEST_KEY, None).await;
            assert!(matches!(result, Err(WalletError::Validation(_))), "{} / {} gave {:?}", to, amount, result);
        }
    }

    #[tokio::test]
    async fn test_send_rejects_bad_key_before_network() {
        let manager = manager(untouched_chain());
        let result = manager.send_transaction(RECIPIENT, "1000", "0x00", None).await;
        assert!(matches!(result, Err(WalletError::Validation(_))));
    }

    #[tokio::test]
    async fn test_send_transaction_happy_path() {
        let mut chain = MockChainClient::new();
        chain.expect_chain_id().times(1).returning(|| Ok(11155111));
        chain.expect_transaction_count()
            .with(eq(TEST_ADDRESS))
            .times(1)
            .returning(|_| Ok(3));
        chain.expect_gas_price().times(1).returning(|| Ok(U256::from(1_000_000_000u64)));
        chain.expect_estimate_gas().times(1).returning(|_, _, _| Ok(21000));
        chain.expect_send_raw_transaction()
            .times(1)
            .returning(|raw| Ok(format!("0x{}", hex::encode(crate::shared::utils::keccak256(raw)))));
        let mut polls = 0;
        chain.expect_transaction_receipt().times(2).returning(move |hash| {
            polls += 1;
            if polls == 1 {
                return Ok(None);
            }
            Ok(Some(TransactionReceipt {
                hash: hash.to_string(),
                status: TransactionStatus::Confirmed,
                block_number: Some(100),
                gas_used: Some(21000),
            }))
        });

        let receipt = manager(chain)
            .send_transaction(RECIPIENT, "10000000000000000", TEST_KEY, None)
            .await
            .expect("Failed to send transaction");
        assert_eq!(receipt.status, TransactionStatus::Confirmed);
        assert_eq!(receipt.block_number, Some(100));
    }

    #[tokio::test]
    async fn test_reverted_transaction_is_an_error() {
        let mut chain = MockChainClient::new();
        chain.expect_chain_id().returning(|| Ok(11155111));
        chain.expect_transaction_count().returning(|_| Ok(0));
        chain.expect_gas_price().returning(|| Ok(U256::from(1u64)));
        chain.expect_estimate_gas().returning(|_, _, _| Err(WalletError::network("execution reverted")));
        chain.expect_send_raw_transaction().returning(|_| Ok("0xabc".to_string()));
        chain.expect_transaction_receipt().returning(|hash| {
            Ok(Some(TransactionReceipt {
                hash: hash.to_string(),
                status: TransactionStatus::Failed,
                block_number: Some(1),
                gas_used: Some(21000),
            }))
        });

        let result = manager(chain).send_transaction(RECIPIENT, "1", TEST_KEY, None).await;
        assert!(matches!(result, Err(WalletError::Transaction(_))));
    }

    #[tokio::test]
    async fn test_wait_for_receipt_times_out() {
        let mut chain = MockChainClient::new();
        chain.expect_transaction_receipt().returning(|_| Ok(None));
        let manager = TransactionManager::new(Arc::new(chain), Duration::from_secs(1), Duration::from_millis(50))
            .with_poll_interval(Duration::from_millis(10));

        let result = manager.wait_for_receipt("0xabc", None).await;
        assert!(matches!(result, Err(WalletError::Timeout(_))));
    }

    #[tokio::test]
    async fn test_cancelled_balance_query() {
        let mut chain = MockChainClient::new();
        chain.expect_get_balance().returning(|_| Ok(U256::one()));
        let manager = manager(chain);

        let token = CancellationToken::new();
        token.cancel();
        let result = manager.get_balance(TEST_ADDRESS, Some(&token)).await;
        assert!(matches!(result, Err(WalletError::Cancelled(_))));
    }

    #[tokio::test]
    async fn test_wallet_details() {
        let mut chain = MockChainClient::new();
        chain.expect_get_balance()
            .with(eq(TEST_ADDRESS))
            .returning(|_| Ok(U256::exp10(16)));
        chain.expect_chain_id().returning(|| Ok(11155111));

        let record = WalletRecord::new(None, TEST_ADDRESS.to_string(), TEST_KEY.to_string());
        let details = manager(chain).wallet_details(&record, None).await.expect("details");
        assert_eq!(details.balance_wei, "10000000000000000");
        assert!(details.balance_ether.starts_with("0.01"));
        assert_eq!(details.network_name, "sepolia");
    }

    #[test]
    fn test_chain_name() {
        assert_eq!(chain_name(11155111), "sepolia");
        assert_eq!(chain_name(424242), "chain 424242");
    }
}
