//! Error handling for the wallet core
//!
//! This module defines the error types used throughout the wallet core.
//! Every error degrades to a human-readable [`Notice`] at the application
//! boundary; there is no machine-readable error code surface.

use thiserror::Error;
use crate::shared::types::Notice;

/// Wallet error type
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WalletError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Initialization error: {0}")]
    Initialization(String),

    #[error("Pairing error: {0}")]
    Pairing(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Grant submission error: {0}")]
    GrantSubmission(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Cryptographic error: {0}")]
    Crypto(String),

    #[error("Operation timed out: {0}")]
    Timeout(String),

    #[error("Operation cancelled: {0}")]
    Cancelled(String),

    #[error("Wallet not found: {0}")]
    WalletNotFound(String),

    #[error("Transaction error: {0}")]
    Transaction(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl WalletError {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create an initialization error
    pub fn initialization(message: impl Into<String>) -> Self {
        Self::Initialization(message.into())
    }

    /// Create a pairing error
    pub fn pairing(message: impl Into<String>) -> Self {
        Self::Pairing(message.into())
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a network error
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    /// Create a grant submission error
    pub fn grant_submission(message: impl Into<String>) -> Self {
        Self::GrantSubmission(message.into())
    }

    /// Create a storage error
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage(message.into())
    }

    /// Create a cryptographic error
    pub fn crypto(message: impl Into<String>) -> Self {
        Self::Crypto(message.into())
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::Timeout(message.into())
    }

    pub fn cancelled(message: impl Into<String>) -> Self {
        Self::Cancelled(message.into())
    }

    /// Create a wallet not found error
    pub fn wallet_not_found(message: impl Into<String>) -> Self {
        Self::WalletNotFound(message.into())
    }

    /// Create a transaction error
    pub fn transaction(message: impl Into<String>) -> Self {
        Self::Transaction(message.into())
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// The detail message without the category prefix
    pub fn detail(&self) -> &str {
        match self {
            Self::Config(m)
            | Self::Initialization(m)
            | Self::Pairing(m)
            | Self::Validation(m)
            | Self::Network(m)
            | Self::GrantSubmission(m)
            | Self::Storage(m)
            | Self::Crypto(m)
            | Self::Timeout(m)
            | Self::Cancelled(m)
            | Self::WalletNotFound(m)
            | Self::Transaction(m)
            | Self::Internal(m) => m,
        }
    }

    /// Convert the error into a blocking user notification
    pub fn notice(&self) -> Notice {
        let title = match self {
            Self::Config(_) => "Configuration Error",
            Self::Initialization(_) => "Pairing Unavailable",
            Self::Pairing(_) => "Pairing Failed",
            Self::Validation(_) => "Invalid Input",
            Self::Network(_) => "Network Error",
            Self::GrantSubmission(_) => "Session Approval Failed",
            Self::Storage(_) => "Storage Error",
            Self::Crypto(_) => "Key Error",
            Self::Timeout(_) => "Request Timed Out",
            Self::Cancelled(_) => "Cancelled",
            Self::WalletNotFound(_) => "No Wallet",
            Self::Transaction(_) => "Transaction Failed",
            Self::Internal(_) => "Error",
        };
        Notice::new(title, self.detail())
    }
}

// Standard library error conversions
impl From<std::io::Error> for WalletError {
    fn from(err: std::io::Error) -> Self {
        Self::storage(format!("IO error: {}", err))
    }
}

impl From<hex::FromHexError> for WalletError {
    fn from(err: hex::FromHexError) -> Self {
        Self::validation(format!("Hex decoding error: {}", err))
    }
}

impl From<serde_json::Error> for WalletError {
    fn from(err: serde_json::Error) -> Self {
        Self::storage(format!("JSON error: {}", err))
    }
}

impl From<tokio::task::JoinError> for WalletError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::internal(format!("Task join error: {}", err))
    }
}

impl From<reqwest::Error> for WalletError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::timeout(format!("HTTP request timed out: {}", err))
        } else {
            Self::network(format!("HTTP error: {}", err))
        }
    }
}

impl From<::config::ConfigError> for WalletError {
    fn from(err: ::config::ConfigError) -> Self {
        Self::config(err.to_string())
    }
}

// Cryptographic error conversions
impl From<secp256k1::Error> for WalletError {
    fn from(err: secp256k1::Error) -> Self {
        Self::crypto(format!("Secp256k1 error: {}", err))
    }
}

impl From<bip39::Error> for WalletError {
    fn from(err: bip39::Error) -> Self {
        Self::validation(format!("Invalid BIP39 seed phrase: {}", err))
    }
}

impl From<bip32::Error> for WalletError {
    fn from(err: bip32::Error) -> Self {
        Self::crypto(format!("Key derivation error: {}", err))
    }
}
