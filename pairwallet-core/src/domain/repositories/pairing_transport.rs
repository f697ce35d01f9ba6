//! Pairing transport port
//!
//! The relay-side session protocol: pairing with a peer from a URI, receiving
//! its session proposals, and answering them.

use crate::domain::entities::{AppMetadata, SessionGrant, SessionProposal};
use crate::shared::error::WalletError;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Parameters handed to the transport at construction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    pub project_id: String,
    pub relay_url: String,
    pub metadata: AppMetadata,
}

/// An established relay connection
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PairingTransport: Send + Sync {
    /// Pair with the peer encoded in `uri`
    async fn pair(&self, uri: &str) -> Result<(), WalletError>;

    /// Submit an approved grant for a proposal
    async fn approve_session(&self, grant: &SessionGrant) -> Result<(), WalletError>;

    /// Decline a proposal
    async fn reject_session(&self, proposal_id: &str, reason: &str) -> Result<(), WalletError>;

    /// Hand over the incoming proposal stream; yields `None` after the first call
    fn take_proposals(&self) -> Option<mpsc::Receiver<SessionProposal>>;
}

/// Builds a transport from connection parameters
#[async_trait]
pub trait TransportFactory: Send + Sync {
    async fn connect(&self, config: &ConnectionConfig) -> Result<Arc<dyn PairingTransport>, WalletError>;
}
