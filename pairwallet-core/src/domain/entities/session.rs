//! Pairing and session entities
//!
//! Wire-visible shapes exchanged with a paired peer. Namespace keys follow
//! CAIP-2 (`eip155:<chainId>`) and accounts follow CAIP-10
//! (`eip155:<chainId>:<address>`).

use crate::shared::config::MetadataConfig;
use crate::shared::constants::EIP155_NAMESPACE;
use crate::shared::error::WalletError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Identification metadata of a wallet or a dapp
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppMetadata {
    pub name: String,
    pub description: String,
    pub url: String,
    pub icons: Vec<String>,
}

impl From<&MetadataConfig> for AppMetadata {
    fn from(config: &MetadataConfig) -> Self {
        Self {
            name: config.name.clone(),
            description: config.description.clone(),
            url: config.url.clone(),
            icons: config.icons.clone(),
        }
    }
}

/// Decoded pairing code, consumed once by the broker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairingRequest {
    pub uri: String,
}

impl PairingRequest {
    pub fn new(uri: impl Into<String>) -> Self {
        Self { uri: uri.into() }
    }

    /// The URI with surrounding whitespace removed
    pub fn trimmed_uri(&self) -> &str {
        self.uri.trim()
    }

    pub fn is_empty(&self) -> bool {
        self.trimmed_uri().is_empty()
    }

    /// Pairing topic of a `wc:<topic>@<version>?...` URI
    pub fn topic(&self) -> Option<&str> {
        let rest = self.trimmed_uri().strip_prefix("wc:")?;
        let topic = rest.split(['@', '?']).next()?;
        (!topic.is_empty()).then_some(topic)
    }
}

/// Capabilities a peer asks for within one namespace
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RequestedNamespace {
    #[serde(default)]
    pub chains: Vec<String>,
    #[serde(default)]
    pub methods: BTreeSet<String>,
    #[serde(default)]
    pub events: BTreeSet<String>,
}

/// Session proposal received from a paired peer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SessionProposal {
    pub id: String,
    #[serde(default)]
    pub proposer: AppMetadata,
    #[serde(default)]
    pub requested_namespaces: BTreeMap<String, RequestedNamespace>,
    /// Topic of the pairing the proposal arrived on
    #[serde(default)]
    pub pairing_topic: Option<String>,
}

/// Capabilities granted within one namespace
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct NamespaceGrant {
    pub accounts: BTreeSet<String>,
    pub methods: BTreeSet<String>,
    pub events: BTreeSet<String>,
}

/// Approved capability contract for one session
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SessionGrant {
    pub proposal_id: String,
    pub namespaces: BTreeMap<String, NamespaceGrant>,
    pub approved_at: DateTime<Utc>,
    #[serde(default)]
    pub peer: Option<AppMetadata>,
    #[serde(default)]
    pub pairing_topic: Option<String>,
}

impl SessionGrant {
    /// Every account across all granted namespaces
    pub fn accounts(&self) -> impl Iterator<Item = &str> {
        self.namespaces.values().flat_map(|ns| ns.accounts.iter().map(String::as_str))
    }
}

/// CAIP-2 namespace key for an EVM chain
pub fn eip155_namespace_key(chain_id: u64) -> String {
    format!("{}:{}", EIP155_NAMESPACE, chain_id)
}

/// CAIP-10 account id for an EVM address
pub fn eip155_account(chain_id: u64, address: &str) -> String {
    format!("{}:{}:{}", EIP155_NAMESPACE, chain_id, address)
}

/// Outcome of handling one proposal, broadcast to subscribers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    Approved(SessionGrant),
    /// Not approved; the peer was told so when the grant could not be built
    Failed {
        proposal_id: String,
        pairing_topic: Option<String>,
        error: WalletError,
    },
}

impl SessionEvent {
    pub fn proposal_id(&self) -> &str {
        match self {
            Self::Approved(grant) => &grant.proposal_id,
            Self::Failed { proposal_id, .. } => proposal_id,
        }
    }

    pub fn pairing_topic(&self) -> Option<&str> {
        match self {
            Self::Approved(grant) => grant.pairing_topic.as_deref(),
            Self::Failed { pairing_topic, .. } => pairing_topic.as_deref(),
        }
    }
}
