//! Runtime configuration for the wallet core
//!
//! Values come from built-in defaults overridden by `WALLET_CORE_*`
//! environment variables (a `.env` file is loaded first when present).
//! Nested keys use a double underscore, e.g. `WALLET_CORE_METADATA__NAME`.

use crate::shared::constants::*;
use crate::shared::error::WalletError;
use crate::shared::utils::validate_ethereum_address;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Where the session grant takes its account from
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GrantPolicy {
    /// Read the resident wallet's address at grant time
    ActiveWallet,
    /// Always grant `fixed_grant_address`
    Fixed,
}

impl Default for GrantPolicy {
    fn default() -> Self {
        Self::ActiveWallet
    }
}

/// Identification metadata advertised to paired peers
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MetadataConfig {
    #[serde(default = "default_metadata_name")]
    pub name: String,
    #[serde(default = "default_metadata_description")]
    pub description: String,
    #[serde(default = "default_metadata_url")]
    pub url: String,
    #[serde(default = "default_metadata_icons")]
    pub icons: Vec<String>,
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self {
            name: default_metadata_name(),
            description: default_metadata_description(),
            url: default_metadata_url(),
            icons: default_metadata_icons(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WalletCoreConfig {
    #[serde(default = "default_rpc_url")]
    pub rpc_url: String,
    #[serde(default = "default_chain_id")]
    pub chain_id: u64,
    /// Relay tenancy identifier handed to the pairing transport
    #[serde(default)]
    pub project_id: String,
    #[serde(default = "default_relay_url")]
    pub relay_url: String,
    #[serde(default)]
    pub metadata: MetadataConfig,
    #[serde(default = "default_network_timeout_ms")]
    pub network_timeout_ms: u64,
    #[serde(default = "default_confirmation_timeout_ms")]
    pub confirmation_timeout_ms: u64,
    /// Defaults to `<data_dir>/pairwallet`
    #[serde(default)]
    pub storage_dir: Option<PathBuf>,
    #[serde(default)]
    pub grant_policy: GrantPolicy,
    #[serde(default = "default_fixed_grant_address")]
    pub fixed_grant_address: String,
    #[serde(default = "default_persist_sessions")]
    pub persist_sessions: bool,
}

impl Default for WalletCoreConfig {
    fn default() -> Self {
        Self {
            rpc_url: default_rpc_url(),
            chain_id: default_chain_id(),
            project_id: String::new(),
            relay_url: default_relay_url(),
            metadata: MetadataConfig::default(),
            network_timeout_ms: default_network_timeout_ms(),
            confirmation_timeout_ms: default_confirmation_timeout_ms(),
            storage_dir: None,
            grant_policy: GrantPolicy::default(),
            fixed_grant_address: default_fixed_grant_address(),
            persist_sessions: default_persist_sessions(),
        }
    }
}

impl WalletCoreConfig {
    /// Load configuration from `.env` and `WALLET_CORE_*` variables
    pub fn load() -> Result<Self, WalletError> {
        dotenv::dotenv().ok();
        Self::from_environment(::config::Environment::with_prefix("WALLET_CORE"))
    }

    /// Build configuration from an explicit environment source
    pub fn from_environment(environment: ::config::Environment) -> Result<Self, WalletError> {
        let settings = ::config::Config::builder()
            .add_source(
                environment
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("metadata.icons"),
            )
            .build()?;
        let config: WalletCoreConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), WalletError> {
        if self.rpc_url.trim().is_empty() {
            return Err(WalletError::config("rpc_url must not be empty"));
        }
        if self.chain_id == 0 {
            return Err(WalletError::config("chain_id must be non-zero"));
        }
        if self.network_timeout_ms == 0 || self.confirmation_timeout_ms == 0 {
            return Err(WalletError::config("timeouts must be non-zero"));
        }
        if self.grant_policy == GrantPolicy::Fixed {
            validate_ethereum_address(&self.fixed_grant_address)
                .map_err(|e| WalletError::config(format!("fixed_grant_address: {}", e)))?;
        }
        Ok(())
    }

    pub fn network_timeout(&self) -> Duration {
        Duration::from_millis(self.network_timeout_ms)
    }

    pub fn confirmation_timeout(&self) -> Duration {
        Duration::from_millis(self.confirmation_timeout_ms)
    }

    /// Directory backing the file key-value store
    pub fn resolved_storage_dir(&self) -> PathBuf {
        self.storage_dir.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("./secure_storage"))
                .join(STORAGE_DIR_NAME)
        })
    }
}

fn default_rpc_url() -> String {
    DEFAULT_RPC_URL.to_string()
}

fn default_chain_id() -> u64 {
    SEPOLIA_CHAIN_ID
}

fn default_relay_url() -> String {
    DEFAULT_RELAY_URL.to_string()
}

fn default_network_timeout_ms() -> u64 {
    DEFAULT_NETWORK_TIMEOUT_MS
}

fn default_confirmation_timeout_ms() -> u64 {
    DEFAULT_CONFIRMATION_TIMEOUT_MS
}

fn default_fixed_grant_address() -> String {
    FIXED_GRANT_ADDRESS.to_string()
}

fn default_persist_sessions() -> bool {
    true
}

fn default_metadata_name() -> String {
    DEFAULT_METADATA_NAME.to_string()
}

fn default_metadata_description() -> String {
    DEFAULT_METADATA_DESCRIPTION.to_string()
}

fn default_metadata_url() -> String {
    DEFAULT_METADATA_URL.to_string()
}

fn default_metadata_icons() -> Vec<String> {
    vec![DEFAULT_METADATA_ICON.to_string()]
}
