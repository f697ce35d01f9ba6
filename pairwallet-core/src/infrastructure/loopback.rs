//! In-process pairing transport
//!
//! Stands in for the relay when the wallet and the peer live in the same
//! process (integration tests, demos). A peer publishes an offer under a
//! pairing URI; pairing with that URI delivers the offer's proposal to the
//! wallet, and the wallet's answers are recorded for inspection.

use crate::domain::entities::{AppMetadata, RequestedNamespace, SessionGrant, SessionProposal};
use crate::domain::repositories::{ConnectionConfig, PairingTransport, TransportFactory};
use crate::shared::constants::PROPOSAL_CHANNEL_CAPACITY;
use crate::shared::error::WalletError;
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

/// Wallet-side answer to a proposal, as seen by the peer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PeerAnswer {
    Approved(SessionGrant),
    Rejected { proposal_id: String, reason: String },
}

pub struct LoopbackTransport {
    config: ConnectionConfig,
    offers: Mutex<HashMap<String, SessionProposal>>,
    answers: Mutex<Vec<PeerAnswer>>,
    proposals_tx: mpsc::Sender<SessionProposal>,
    proposals_rx: Mutex<Option<mpsc::Receiver<SessionProposal>>>,
    fail_approvals: Mutex<Option<String>>,
}

impl LoopbackTransport {
    pub fn new(config: ConnectionConfig) -> Self {
        let (proposals_tx, proposals_rx) = mpsc::channel(PROPOSAL_CHANNEL_CAPACITY);
        Self {
            config,
            offers: Mutex::new(HashMap::new()),
            answers: Mutex::new(Vec::new()),
            proposals_tx,
            proposals_rx: Mutex::new(Some(proposals_rx)),
            fail_approvals: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    /// Publish a proposal from `proposer` asking for `requested`
    ///
    /// Returns the pairing URI the wallet must pair with.
    pub fn offer(
        &self,
        proposer: AppMetadata,
        requested: BTreeMap<String, RequestedNamespace>,
    ) -> Result<String, WalletError> {
        let topic = uuid::Uuid::new_v4().simple().to_string();
        let sym_key = format!(
            "{}{}",
            uuid::Uuid::new_v4().simple(),
            uuid::Uuid::new_v4().simple()
        );
        let uri = format!("wc:{}@2?relay-protocol=irn&symKey={}", topic, sym_key);
        let proposal = SessionProposal {
            id: uuid::Uuid::new_v4().to_string(),
            proposer,
            requested_namespaces: requested,
            pairing_topic: Some(topic.clone()),
        };
        lock(&self.offers)?.insert(topic, proposal);
        Ok(uri)
    }

    /// Make every subsequent approval fail with `reason`
    pub fn fail_approvals(&self, reason: impl Into<String>) -> Result<(), WalletError> {
        *lock(&self.fail_approvals)? = Some(reason.into());
        Ok(())
    }

    /// Answers submitted so far, oldest first
    pub fn answers(&self) -> Result<Vec<PeerAnswer>, WalletError> {
        Ok(lock(&self.answers)?.clone())
    }

    fn topic_of(uri: &str) -> Result<&str, WalletError> {
        let rest = uri
            .strip_prefix("wc:")
            .ok_or_else(|| WalletError::pairing(format!("Unsupported pairing URI: {}", uri)))?;
        let topic = rest.split('@').next().unwrap_or_default();
        if topic.is_empty() {
            return Err(WalletError::pairing("Pairing URI carries no topic"));
        }
        Ok(topic)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> Result<std::sync::MutexGuard<'_, T>, WalletError> {
    mutex.lock().map_err(|_| WalletError::internal("Loopback transport lock poisoned"))
}

#[async_trait]
impl PairingTransport for LoopbackTransport {
    async fn pair(&self, uri: &str) -> Result<(), WalletError> {
        let topic = Self::topic_of(uri)?;
        let proposal = lock(&self.offers)?
            .remove(topic)
            .ok_or_else(|| WalletError::pairing(format!("No peer is waiting on topic {}", topic)))?;
        log::debug!("Loopback pairing on topic {} delivers proposal {}", topic, proposal.id);
        self.proposals_tx
            .send(proposal)
            .await
            .map_err(|_| WalletError::pairing("Proposal listener has gone away"))
    }

    async fn approve_session(&self, grant: &SessionGrant) -> Result<(), WalletError> {
        if let Some(reason) = lock(&self.fail_approvals)?.clone() {
            return Err(WalletError::grant_submission(reason));
        }
        lock(&self.answers)?.push(PeerAnswer::Approved(grant.clone()));
        Ok(())
    }

    async fn reject_session(&self, proposal_id: &str, reason: &str) -> Result<(), WalletError> {
        lock(&self.answers)?.push(PeerAnswer::Rejected {
            proposal_id: proposal_id.to_string(),
            reason: reason.to_string(),
        });
        Ok(())
    }

    fn take_proposals(&self) -> Option<mpsc::Receiver<SessionProposal>> {
        self.proposals_rx.lock().ok().and_then(|mut rx| rx.take())
    }
}

/// Factory handing out one shared loopback transport
///
/// Connecting requires a non-empty project id, mirroring relay tenancy.
/// A number of leading connection attempts can be made to fail.
pub struct LoopbackTransportFactory {
    transport: Mutex<Option<Arc<LoopbackTransport>>>,
    failures_left: AtomicUsize,
    connects: AtomicUsize,
}

impl LoopbackTransportFactory {
    pub fn new() -> Self {
        Self::failing_first(0)
    }

    pub fn failing_first(failures: usize) -> Self {
        Self {
            transport: Mutex::new(None),
            failures_left: AtomicUsize::new(failures),
            connects: AtomicUsize::new(0),
        }
    }

    /// Number of connection attempts made, successful or not
    pub fn connect_attempts(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    /// The transport built by the last successful `connect`
    pub fn transport(&self) -> Option<Arc<LoopbackTransport>> {
        self.transport.lock().ok().and_then(|t| t.clone())
    }
}

impl Default for LoopbackTransportFactory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TransportFactory for LoopbackTransportFactory {
    async fn connect(&self, config: &ConnectionConfig) -> Result<Arc<dyn PairingTransport>, WalletError> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        if config.project_id.trim().is_empty() {
            return Err(WalletError::initialization("Project id is required to reach the relay"));
        }
        let should_fail = self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if should_fail {
            return Err(WalletError::initialization(format!("Relay {} unreachable", config.relay_url)));
        }

        let transport = Arc::new(LoopbackTransport::new(config.clone()));
        *lock(&self.transport)? = Some(transport.clone());
        Ok(transport)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::PairingRequest;

    fn connection_config() -> ConnectionConfig {
        ConnectionConfig {
            project_id: "f6663411394f06fa3c0d51b351a7958e".to_string(),
            relay_url: "wss://relay.walletconnect.com".to_string(),
            metadata: AppMetadata::default(),
        }
    }

    #[tokio::test]
    async fn test_pair_delivers_offered_proposal() {
        let transport = LoopbackTransport::new(connection_config());
        let mut proposals = transport.take_proposals().expect("First take yields the receiver");
        assert!(transport.take_proposals().is_none());

        let uri = transport.offer(AppMetadata::default(), BTreeMap::new()).expect("offer");
        assert!(uri.starts_with("wc:"));
        transport.pair(&uri).await.expect("Failed to pair");

        let proposal = proposals.recv().await.expect("proposal delivered");
        assert!(!proposal.id.is_empty());
        assert_eq!(proposal.pairing_topic.as_deref(), PairingRequest::new(uri.as_str()).topic());

        // Topics are single use
        assert!(matches!(transport.pair(&uri).await, Err(WalletError::Pairing(_))));
    }

    #[tokio::test]
    async fn test_pair_rejects_unknown_uri() {
        let transport = LoopbackTransport::new(connection_config());
        assert!(transport.pair("https://example.com").await.is_err());
        assert!(transport.pair("wc:deadbeef@2?relay-protocol=irn").await.is_err());
    }

    #[tokio::test]
    async fn test_factory_requires_project_id_and_counts_attempts() {
        let factory = LoopbackTransportFactory::failing_first(1);
        let mut config = connection_config();

        assert!(factory.connect(&config).await.is_err());
        assert!(factory.transport().is_none());
        assert!(factory.connect(&config).await.is_ok());
        assert!(factory.transport().is_some());

        config.project_id.clear();
        assert!(matches!(factory.connect(&config).await, Err(WalletError::Initialization(_))));
        assert_eq!(factory.connect_attempts(), 3);
    }
}
