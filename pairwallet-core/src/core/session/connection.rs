//! Relay connection lifecycle
//!
//! A [`ConnectionHolder`] builds the transport at most once and shares the
//! resulting [`ConnectionHandle`] with every pairing attempt. A failed build
//! leaves the holder empty so the next call tries again.

use crate::domain::entities::AppMetadata;
use crate::domain::repositories::{ConnectionConfig, PairingTransport, TransportFactory};
use crate::shared::config::WalletCoreConfig;
use crate::shared::error::WalletError;
use crate::shared::utils::run_bounded;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::OnceCell;

impl From<&WalletCoreConfig> for ConnectionConfig {
    fn from(config: &WalletCoreConfig) -> Self {
        Self {
            project_id: config.project_id.clone(),
            relay_url: config.relay_url.clone(),
            metadata: AppMetadata::from(&config.metadata),
        }
    }
}

/// Initialized transport plus the parameters it was built with
pub struct ConnectionHandle {
    transport: Arc<dyn PairingTransport>,
    config: ConnectionConfig,
}

impl ConnectionHandle {
    pub fn transport(&self) -> &Arc<dyn PairingTransport> {
        &self.transport
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }
}

pub struct ConnectionHolder {
    factory: Arc<dyn TransportFactory>,
    config: ConnectionConfig,
    timeout: Duration,
    cell: OnceCell<Arc<ConnectionHandle>>,
}

impl ConnectionHolder {
    pub fn new(factory: Arc<dyn TransportFactory>, config: ConnectionConfig, timeout: Duration) -> Self {
        Self {
            factory,
            config,
            timeout,
            cell: OnceCell::new(),
        }
    }

    /// The handle, if construction has already succeeded
    pub fn get(&self) -> Option<Arc<ConnectionHandle>> {
        self.cell.get().cloned()
    }

    pub fn is_initialized(&self) -> bool {
        self.cell.initialized()
    }

    /// Return the handle, constructing it on first use
    ///
    /// `on_created` runs only for the call that actually builds the handle,
    /// so hooks registered through it run once per holder.
    pub async fn get_or_init<F>(&self, on_created: F) -> Result<Arc<ConnectionHandle>, WalletError>
    where
        F: FnOnce(&Arc<ConnectionHandle>),
    {
        let handle = self
            .cell
            .get_or_try_init(|| async {
                if self.config.project_id.trim().is_empty() {
                    return Err(WalletError::initialization("Project id is not configured"));
                }
                log::info!("Connecting to relay {}", self.config.relay_url);
                let transport = run_bounded(
                    "relay connection",
                    self.timeout,
                    None,
                    self.factory.connect(&self.config),
                )
                .await
                .map_err(|e| match e {
                    WalletError::Initialization(_) => e,
                    other => WalletError::initialization(other.to_string()),
                })?;
                let handle = Arc::new(ConnectionHandle {
                    transport,
                    config: self.config.clone(),
                });
                on_created(&handle);
                Ok(handle)
            })
            .await
            .inspect_err(|e| log::error!("Connection initialization failed: {}", e))?;
        Ok(handle.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::loopback::LoopbackTransportFactory;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn config(project_id: &str) -> ConnectionConfig {
        ConnectionConfig {
            project_id: project_id.to_string(),
            relay_url: "wss://relay.walletconnect.com".to_string(),
            metadata: AppMetadata::default(),
        }
    }

    #[tokio::test]
    async fn test_constructs_once_under_concurrency() {
        let factory = Arc::new(LoopbackTransportFactory::new());
        let holder = Arc::new(ConnectionHolder::new(factory.clone(), config("project"), Duration::from_secs(5)));
        let hooks = Arc::new(AtomicUsize::new(0));

        let mut tasks = Vec::new();
        for _ in 0..8 {
            let holder = holder.clone();
            let hooks = hooks.clone();
            tasks.push(tokio::spawn(async move {
                holder
                    .get_or_init(|_| {
                        hooks.fetch_add(1, Ordering::SeqCst);
                    })
                    .await
                    .expect("Failed to initialize connection")
            }));
        }
        let mut handles = Vec::new();
        for task in tasks {
            handles.push(task.await.expect("task"));
        }

        assert_eq!(factory.connect_attempts(), 1);
        assert_eq!(hooks.load(Ordering::SeqCst), 1);
        assert!(handles.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
    }

    #[tokio::test]
    async fn test_failed_construction_is_retryable() {
        let factory = Arc::new(LoopbackTransportFactory::failing_first(1));
        let holder = ConnectionHolder::new(factory.clone(), config("project"), Duration::from_secs(5));

        let first = holder.get_or_init(|_| {}).await;
        assert!(matches!(first, Err(WalletError::Initialization(_))));
        assert!(holder.get().is_none());

        holder.get_or_init(|_| {}).await.expect("second attempt succeeds");
        assert!(holder.is_initialized());
        assert_eq!(factory.connect_attempts(), 2);
    }

    #[tokio::test]
    async fn test_empty_project_id_never_reaches_factory() {
        let factory = Arc::new(LoopbackTransportFactory::new());
        let holder = ConnectionHolder::new(factory.clone(), config("  "), Duration::from_secs(5));

        assert!(matches!(holder.get_or_init(|_| {}).await, Err(WalletError::Initialization(_))));
        assert_eq!(factory.connect_attempts(), 0);
    }

    #[test]
    fn test_connection_config_from_wallet_config() {
        let wallet_config = WalletCoreConfig {
            project_id: "abc".to_string(),
            ..WalletCoreConfig::default()
        };
        let config = ConnectionConfig::from(&wallet_config);
        assert_eq!(config.project_id, "abc");
        assert_eq!(config.metadata.name, "My Wallet");
        assert_eq!(config.relay_url, "wss://relay.walletconnect.com");
    }
}
