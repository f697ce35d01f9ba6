//! JSON-RPC chain client
//!
//! Plain `reqwest` + `serde_json` client for the handful of `eth_*` methods
//! the wallet needs.

use crate::domain::repositories::ChainClient;
use crate::shared::error::WalletError;
use crate::shared::types::{TransactionReceipt, TransactionStatus};
use crate::shared::utils::{parse_quantity, parse_quantity_u64};
use async_trait::async_trait;
use ethers::types::U256;
use reqwest::Client;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

pub struct JsonRpcChainClient {
    client: Client,
    rpc_url: String,
    next_id: AtomicU64,
}

impl JsonRpcChainClient {
    /// Create a client; `timeout` bounds each HTTP round trip
    pub fn new(rpc_url: impl Into<String>, timeout: Duration) -> Result<Self, WalletError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| WalletError::network(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            rpc_url: rpc_url.into(),
            next_id: AtomicU64::new(1),
        })
    }

    pub fn rpc_url(&self) -> &str {
        &self.rpc_url
    }

    async fn call(&self, method: &str, params: Value) -> Result<Value, WalletError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
            "id": id
        });
        log::debug!("RPC {} -> {}", method, self.rpc_url);

        let resp = self.client.post(&self.rpc_url)
            .json(&body)
            .send()
            .await?;
        let resp_json: Value = resp.json().await
            .map_err(|e| WalletError::network(format!("Invalid response to {}: {}", method, e)))?;

        if let Some(error) = resp_json.get("error") {
            let message = error.get("message")
                .and_then(Value::as_str)
                .unwrap_or("unknown error");
            return Err(WalletError::network(format!("{} failed: {}", method, message)));
        }
        resp_json.get("result")
            .cloned()
            .ok_or_else(|| WalletError::network(format!("No result returned for {}", method)))
    }

    async fn call_quantity(&self, method: &str, params: Value) -> Result<U256, WalletError> {
        let result = self.call(method, params).await?;
        let quantity = result.as_str()
            .ok_or_else(|| WalletError::network(format!("{} returned a non-string result", method)))?;
        parse_quantity(quantity)
    }
}

fn quantity_to_u64(value: U256, method: &str) -> Result<u64, WalletError> {
    if value > U256::from(u64::MAX) {
        return Err(WalletError::network(format!("{} result out of range", method)));
    }
    Ok(value.as_u64())
}

/// Decode an `eth_getTransactionReceipt` result
pub(crate) fn parse_receipt(hash: &str, result: &Value) -> Result<Option<TransactionReceipt>, WalletError> {
    if result.is_null() {
        return Ok(None);
    }
    let field = |name: &str| result.get(name).and_then(Value::as_str);

    // Pre-Byzantium receipts carry no status; treat inclusion as success
    let status = match field("status") {
        Some(s) if parse_quantity(s)?.is_zero() => TransactionStatus::Failed,
        _ => TransactionStatus::Confirmed,
    };
    let block_number = field("blockNumber").map(parse_quantity_u64).transpose()?;
    let gas_used = field("gasUsed").map(parse_quantity_u64).transpose()?;

    Ok(Some(TransactionReceipt {
        hash: field("transactionHash").unwrap_or(hash).to_string(),
        status,
        block_number,
        gas_used,
    }))
}

#[async_trait]
impl ChainClient for JsonRpcChainClient {
    async fn get_balance(&self, address: &str) -> Result<U256, WalletError> {
        self.call_quantity("eth_getBalance", json!([address, "latest"])).await
    }

    async fn chain_id(&self) -> Result<u64, WalletError> {
        let value = self.call_quantity("eth_chainId", json!([])).await?;
        quantity_to_u64(value, "eth_chainId")
    }

    async fn transaction_count(&self, address: &str) -> Result<u64, WalletError> {
        let value = self.call_quantity("eth_getTransactionCount", json!([address, "pending"])).await?;
        quantity_to_u64(value, "eth_getTransactionCount")
    }

    async fn gas_price(&self) -> Result<U256, WalletError> {
        self.call_quantity("eth_gasPrice", json!([])).await
    }

    async fn estimate_gas(&self, from: &str, to: &str, value: U256) -> Result<u64, WalletError> {
        let params = json!([{ "from": from, "to": to, "value": format!("0x{:x}", value) }]);
        let estimate = self.call_quantity("eth_estimateGas", params).await?;
        quantity_to_u64(estimate, "eth_estimateGas")
    }

    async fn send_raw_transaction(&self, raw: &[u8]) -> Result<String, WalletError> {
        let tx_hex = format!("0x{}", hex::encode(raw));
        let result = self.call("eth_sendRawTransaction", json!([tx_hex])).await?;
        result.as_str()
            .map(str::to_string)
            .ok_or_else(|| WalletError::network("No transaction hash returned"))
    }

    async fn transaction_receipt(&self, hash: &str) -> Result<Option<TransactionReceipt>, WalletError> {
        let result = self.call("eth_getTransactionReceipt", json!([hash])).await?;
        parse_receipt(hash, &result)
    }
}
