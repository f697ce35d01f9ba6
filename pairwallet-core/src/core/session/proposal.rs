//! Session proposal handling
//!
//! Every proposal is answered with the same capability grant: one EVM
//! namespace for the configured chain, a single account, and a fixed set of
//! methods and events. Nothing requested by the peer is negotiated.

use crate::core::wallet::KeyCustody;
use crate::domain::entities::{
    eip155_account, eip155_namespace_key, NamespaceGrant, SessionEvent, SessionGrant, SessionProposal,
};
use crate::domain::repositories::{PairingTransport, SessionRepository};
use crate::shared::config::{GrantPolicy, WalletCoreConfig};
use crate::shared::constants::{GRANTED_EVENTS, GRANTED_METHODS};
use crate::shared::error::WalletError;
use crate::shared::utils::run_bounded;
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;

/// Fixed-policy grant for `address` on `chain_id`
pub fn build_grant(proposal: &SessionProposal, chain_id: u64, address: &str) -> SessionGrant {
    let namespace = NamespaceGrant {
        accounts: [eip155_account(chain_id, address)].into(),
        methods: GRANTED_METHODS.iter().map(|m| m.to_string()).collect(),
        events: GRANTED_EVENTS.iter().map(|e| e.to_string()).collect(),
    };
    let mut namespaces = BTreeMap::new();
    namespaces.insert(eip155_namespace_key(chain_id), namespace);

    SessionGrant {
        proposal_id: proposal.id.clone(),
        namespaces,
        approved_at: Utc::now(),
        peer: Some(proposal.proposer.clone()),
        pairing_topic: proposal.pairing_topic.clone(),
    }
}

/// Where granted accounts come from
pub enum AccountSource {
    /// The wallet resident in custody at grant time
    ActiveWallet(Arc<KeyCustody>),
    Fixed(String),
}

pub struct GrantBuilder {
    chain_id: u64,
    accounts: AccountSource,
}

impl GrantBuilder {
    pub fn new(chain_id: u64, accounts: AccountSource) -> Self {
        Self { chain_id, accounts }
    }

    pub fn from_config(config: &WalletCoreConfig, custody: Arc<KeyCustody>) -> Self {
        let accounts = match config.grant_policy {
            GrantPolicy::ActiveWallet => AccountSource::ActiveWallet(custody),
            GrantPolicy::Fixed => AccountSource::Fixed(config.fixed_grant_address.clone()),
        };
        Self::new(config.chain_id, accounts)
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    pub fn build(&self, proposal: &SessionProposal) -> Result<SessionGrant, WalletError> {
        let address = match &self.accounts {
            AccountSource::ActiveWallet(custody) => custody.require_current()?.address().to_string(),
            AccountSource::Fixed(address) => address.clone(),
        };
        Ok(build_grant(proposal, self.chain_id, &address))
    }
}

/// Answers incoming proposals and reports each outcome
pub struct ProposalHandler {
    transport: Arc<dyn PairingTransport>,
    grants: Arc<GrantBuilder>,
    repository: Option<Arc<SessionRepository>>,
    events: broadcast::Sender<SessionEvent>,
    timeout: Duration,
}

impl ProposalHandler {
    pub fn new(
        transport: Arc<dyn PairingTransport>,
        grants: Arc<GrantBuilder>,
        repository: Option<Arc<SessionRepository>>,
        events: broadcast::Sender<SessionEvent>,
        timeout: Duration,
    ) -> Self {
        Self {
            transport,
            grants,
            repository,
            events,
            timeout,
        }
    }

    /// Consume `proposals` on a background task until the stream closes
    pub fn spawn(self, mut proposals: mpsc::Receiver<SessionProposal>) -> JoinHandle<()> {
        tokio::spawn(async move {
            while let Some(proposal) = proposals.recv().await {
                self.handle(proposal).await;
            }
            log::debug!("Proposal stream closed");
        })
    }

    pub async fn handle(&self, proposal: SessionProposal) -> SessionEvent {
        log::info!(
            "Session proposal {} from {} ({})",
            proposal.id,
            proposal.proposer.name,
            proposal.proposer.url
        );
        let event = match self.grants.build(&proposal) {
            Ok(grant) => self.approve(grant).await,
            Err(e) => self.reject(&proposal, e).await,
        };
        // No subscribers is fine
        let _ = self.events.send(event.clone());
        event
    }

    async fn approve(&self, grant: SessionGrant) -> SessionEvent {
        let proposal_id = grant.proposal_id.clone();
        let submitted = run_bounded(
            "session approval",
            self.timeout,
            None,
            self.transport.approve_session(&grant),
        )
        .await;

        if let Err(e) = submitted {
            let error = match e {
                WalletError::GrantSubmission(_) => e,
                other => WalletError::grant_submission(other.to_string()),
            };
            log::error!("Approval of session {} failed: {}", proposal_id, error);
            return SessionEvent::Failed {
                proposal_id,
                pairing_topic: grant.pairing_topic,
                error,
            };
        }

        if let Some(repository) = &self.repository {
            if let Err(e) = repository.save(&grant) {
                log::warn!("Session {} approved but not persisted: {}", proposal_id, e);
            }
        }
        log::info!("Session {} approved", proposal_id);
        SessionEvent::Approved(grant)
    }

    async fn reject(&self, proposal: &SessionProposal, error: WalletError) -> SessionEvent {
        let proposal_id = proposal.id.as_str();
        log::warn!("Cannot grant session {}: {}", proposal_id, error);
        let rejected = run_bounded(
            "session rejection",
            self.timeout,
            None,
            self.transport.reject_session(proposal_id, error.detail()),
        )
        .await;
        if let Err(e) = rejected {
            log::error!("Rejection of session {} failed: {}", proposal_id, e);
        }
        SessionEvent::Failed {
            proposal_id: proposal_id.to_string(),
            pairing_topic: proposal.pairing_topic.clone(),
            error,
        }
    }
}
