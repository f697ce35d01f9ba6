//! PairWallet Core
//!
//! Wallet core for a mobile Ethereum wallet: key custody, chain access, and
//! pairing with remote applications over a WalletConnect-style relay.
//!
//! ## Architecture
//!
//! - **Core**: key custody, crypto, transactions and the session broker
//! - **Domain**: entities and the capability traits the core depends on
//! - **Infrastructure**: key-value storage, JSON-RPC client, loopback transport
//! - **Application**: screen-level flows reporting through a notifier
//! - **Shared**: configuration, errors, types, constants and utilities
//!
//! ## Usage
//!
//! ```no_run
//! use pairwallet_core::{init_wallet_core, LoopbackTransportFactory, WalletCoreConfig};
//! use std::sync::Arc;
//!
//! # async fn run() -> Result<(), pairwallet_core::WalletError> {
//! let config = WalletCoreConfig::load()?;
//! let core = init_wallet_core(config, Arc::new(LoopbackTransportFactory::new()))?;
//!
//! let wallet = core.custody().generate()?;
//! let balance = core.transactions().get_balance(wallet.address(), None).await?;
//! core.broker().connect().await?;
//! # Ok(())
//! # }
//! ```

pub mod application;
pub mod core;
pub mod domain;
pub mod infrastructure;
pub mod shared;

use std::sync::Arc;

// Re-export main components
pub use crate::core::session::{AccountSource, ConnectionHolder, GrantBuilder, SessionBroker};
pub use crate::core::transactions::TransactionManager;
pub use crate::core::wallet::{ImportKind, KeyCustody};

// Re-export domain entities and ports
pub use crate::domain::entities::{
    AppMetadata, PairingRequest, SessionEvent, SessionGrant, SessionProposal, WalletRecord,
};
pub use crate::domain::repositories::{ChainClient, CodeScanner, PairingTransport, SessionRepository, TransportFactory};

// Re-export infrastructure
pub use crate::infrastructure::loopback::LoopbackTransportFactory;
pub use crate::infrastructure::platform::{FileStorage, MemoryStorage, PlatformStorage};
pub use crate::infrastructure::rpc::JsonRpcChainClient;

// Re-export shared types
pub use crate::shared::config::WalletCoreConfig;
pub use crate::shared::error::WalletError;
pub use crate::shared::types::{Notice, NetworkInfo, TransactionReceipt, WalletDetails, WalletResult};

/// Initialize logging; `RUST_LOG` controls verbosity
pub fn init() {
    let _ = env_logger::try_init();
}

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Build the wallet core from configuration
///
/// Keys and sessions live in a [`FileStorage`] under the configured storage
/// directory; the chain is reached over JSON-RPC. The pairing transport is
/// supplied by the caller.
pub fn init_wallet_core(
    config: WalletCoreConfig,
    factory: Arc<dyn TransportFactory>,
) -> Result<WalletCore, WalletError> {
    config.validate()?;
    let storage: Arc<dyn PlatformStorage> = Arc::new(FileStorage::new(config.resolved_storage_dir())?);
    let chain: Arc<dyn ChainClient> = Arc::new(JsonRpcChainClient::new(
        config.rpc_url.clone(),
        config.network_timeout(),
    )?);
    log::info!("Wallet core {} on chain {} via {}", VERSION, config.chain_id, config.rpc_url);
    Ok(WalletCore::with_parts(config, storage, chain, factory))
}

/// Main wallet core struct that provides access to all functionality
pub struct WalletCore {
    config: WalletCoreConfig,
    custody: Arc<KeyCustody>,
    transactions: TransactionManager,
    broker: SessionBroker,
}

impl WalletCore {
    /// Assemble the core from explicit capabilities
    pub fn with_parts(
        config: WalletCoreConfig,
        storage: Arc<dyn PlatformStorage>,
        chain: Arc<dyn ChainClient>,
        factory: Arc<dyn TransportFactory>,
    ) -> Self {
        let custody = Arc::new(KeyCustody::new(storage.clone()));
        let transactions = TransactionManager::new(chain, config.network_timeout(), config.confirmation_timeout());
        let holder = Arc::new(ConnectionHolder::new(
            factory,
            (&config).into(),
            config.network_timeout(),
        ));
        let grants = Arc::new(GrantBuilder::from_config(&config, custody.clone()));
        let repository = config
            .persist_sessions
            .then(|| Arc::new(SessionRepository::new(storage)));
        let broker = SessionBroker::new(holder, grants, repository, config.network_timeout());

        Self {
            config,
            custody,
            transactions,
            broker,
        }
    }

    pub fn config(&self) -> &WalletCoreConfig {
        &self.config
    }

    pub fn custody(&self) -> &Arc<KeyCustody> {
        &self.custody
    }

    pub fn transactions(&self) -> &TransactionManager {
        &self.transactions
    }

    pub fn broker(&self) -> &SessionBroker {
        &self.broker
    }
}
