//! Session broker
//!
//! Turns a scanned pairing code into an approved session: connects to the
//! relay on first use, pairs with the peer, and lets the proposal handler
//! answer whatever the peer proposes.

use super::connection::{ConnectionHandle, ConnectionHolder};
use super::proposal::{GrantBuilder, ProposalHandler};
use crate::domain::entities::{PairingRequest, SessionEvent, SessionGrant};
use crate::domain::repositories::{CodeScanner, SessionRepository};
use crate::shared::constants::SESSION_EVENT_CAPACITY;
use crate::shared::error::WalletError;
use crate::shared::utils::run_bounded;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

pub struct SessionBroker {
    holder: Arc<ConnectionHolder>,
    grants: Arc<GrantBuilder>,
    repository: Option<Arc<SessionRepository>>,
    events: broadcast::Sender<SessionEvent>,
    pairing: tokio::sync::Mutex<()>,
    handler_task: Mutex<Option<JoinHandle<()>>>,
    timeout: Duration,
}

impl SessionBroker {
    pub fn new(
        holder: Arc<ConnectionHolder>,
        grants: Arc<GrantBuilder>,
        repository: Option<Arc<SessionRepository>>,
        timeout: Duration,
    ) -> Self {
        let (events, _) = broadcast::channel(SESSION_EVENT_CAPACITY);
        Self {
            holder,
            grants,
            repository,
            events,
            pairing: tokio::sync::Mutex::new(()),
            handler_task: Mutex::new(None),
            timeout,
        }
    }

    /// Receive the outcome of every proposal handled from now on
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Initialize the relay connection and start the proposal handler
    ///
    /// Safe to call repeatedly; the handler is registered once per broker,
    /// whether or not the connection was already initialized elsewhere.
    pub async fn connect(&self) -> Result<Arc<ConnectionHandle>, WalletError> {
        let handle = self.holder.get_or_init(|_| {}).await?;
        self.ensure_handler(&handle)?;
        Ok(handle)
    }

    fn ensure_handler(&self, handle: &Arc<ConnectionHandle>) -> Result<(), WalletError> {
        let mut slot = self
            .handler_task
            .lock()
            .map_err(|_| WalletError::internal("Proposal handler lock poisoned"))?;
        if slot.is_some() {
            return Ok(());
        }
        let proposals = handle.transport().take_proposals().ok_or_else(|| {
            WalletError::initialization("Proposal stream already taken by another handler")
        })?;
        let handler = ProposalHandler::new(
            handle.transport().clone(),
            self.grants.clone(),
            self.repository.clone(),
            self.events.clone(),
            self.timeout,
        );
        *slot = Some(handler.spawn(proposals));
        log::debug!("Proposal handler registered");
        Ok(())
    }

    /// Pair with the peer encoded in `request`
    ///
    /// Requires an initialized connection. Only one pairing may be in flight.
    pub async fn pair(&self, request: &PairingRequest, cancel: Option<&CancellationToken>) -> Result<(), WalletError> {
        if request.is_empty() {
            return Err(WalletError::pairing("Pairing code is empty"));
        }
        let uri = request.trimmed_uri();
        let handle = self
            .holder
            .get()
            .ok_or_else(|| WalletError::pairing("Pairing is unavailable: no relay connection"))?;
        let _in_flight = self
            .pairing
            .try_lock()
            .map_err(|_| WalletError::pairing("Another pairing is already in progress"))?;

        log::info!("Pairing via {}", handle.config().relay_url);
        run_bounded("pairing", self.timeout, cancel, handle.transport().pair(uri))
            .await
            .map_err(|e| match e {
                WalletError::Pairing(_) | WalletError::Timeout(_) | WalletError::Cancelled(_) => e,
                other => WalletError::pairing(other.to_string()),
            })
    }

    /// Wait for the next scanned code and pair with it
    pub async fn pair_from_scanner(
        &self,
        scanner: &dyn CodeScanner,
        cancel: Option<&CancellationToken>,
    ) -> Result<(), WalletError> {
        let code = scanner
            .next_code()
            .await?
            .ok_or_else(|| WalletError::pairing("Scanner closed before a code was read"))?;
        self.pair(&PairingRequest::new(code), cancel).await
    }

    /// Grants persisted by this or an earlier broker
    pub fn active_sessions(&self) -> Result<Vec<SessionGrant>, WalletError> {
        match &self.repository {
            Some(repository) => repository.active_sessions(),
            None => Ok(Vec::new()),
        }
    }

    pub fn forget_session(&self, proposal_id: &str) -> Result<(), WalletError> {
        match &self.repository {
            Some(repository) => repository.forget_session(proposal_id),
            None => Ok(()),
        }
    }
}

impl Drop for SessionBroker {
    fn drop(&mut self) {
        if let Ok(mut slot) = self.handler_task.lock() {
            if let Some(task) = slot.take() {
                task.abort();
            }
        }
    }
}
