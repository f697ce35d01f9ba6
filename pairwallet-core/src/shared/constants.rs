//! Constants for the wallet core
//!
//! This module contains all constants used throughout the wallet core.

// Persisted key-value layout
pub const MNEMONIC_STORAGE_KEY: &str = "mnemonic";
pub const ADDRESS_STORAGE_KEY: &str = "walletAddress";
pub const PRIVATE_KEY_STORAGE_KEY: &str = "privateKey";
pub const SESSION_KEY_PREFIX: &str = "session:";
pub const STORAGE_DIR_NAME: &str = "pairwallet";

// Key material
pub const PRIVATE_KEY_SIZE: usize = 32;
pub const PUBLIC_KEY_SIZE: usize = 65;
pub const ADDRESS_SIZE: usize = 20;
pub const MNEMONIC_ENTROPY_SIZE: usize = 16;
pub const ETH_DERIVATION_PATH: &str = "m/44'/60'/0'/0/0";

// Chain endpoint
pub const SEPOLIA_CHAIN_ID: u64 = 11155111;
pub const DEFAULT_RPC_URL: &str = "https://ethereum-sepolia-rpc.publicnode.com";
pub const NATIVE_CURRENCY: &str = "ETH";

/// Chains the wallet can name when reporting network identity
pub const KNOWN_CHAINS: &[(u64, &str)] = &[
    (1, "mainnet"),
    (11155111, "sepolia"),
    (17000, "holesky"),
    (31337, "anvil"),
];

// Session namespace contract
pub const EIP155_NAMESPACE: &str = "eip155";
pub const GRANTED_METHODS: &[&str] = &["eth_sendTransaction", "personal_sign"];
pub const GRANTED_EVENTS: &[&str] = &["accountsChanged"];
/// Account granted by the fixed grant policy
pub const FIXED_GRANT_ADDRESS: &str = "0x4838B106FCe9647Bdf1E7877BF73cE8B0BAD5f97";

// Wallet metadata advertised to paired peers
pub const DEFAULT_METADATA_NAME: &str = "My Wallet";
pub const DEFAULT_METADATA_DESCRIPTION: &str = "My custom wallet for WalletConnect";
pub const DEFAULT_METADATA_URL: &str = "https://mywallet.com";
pub const DEFAULT_METADATA_ICON: &str = "https://mywallet.com/icon.png";
pub const DEFAULT_RELAY_URL: &str = "wss://relay.walletconnect.com";

// Transaction constants
pub const DEFAULT_GAS_LIMIT: u64 = 21000;
pub const RECEIPT_POLL_INTERVAL_MS: u64 = 2000;

// Timeouts
pub const DEFAULT_NETWORK_TIMEOUT_MS: u64 = 30000;
pub const DEFAULT_CONFIRMATION_TIMEOUT_MS: u64 = 180000;

// Proposal handling
pub const PROPOSAL_CHANNEL_CAPACITY: usize = 16;
pub const SESSION_EVENT_CAPACITY: usize = 32;
