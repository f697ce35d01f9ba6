//! Screen-level flows
//!
//! Each flow raises the loading indicator for its whole duration, reports its
//! outcome as a [`Notice`], and hands back the result (if any) for display.

use super::notifications::{LoadingGuard, Notifier};
use crate::core::session::SessionBroker;
use crate::core::transactions::TransactionManager;
use crate::core::wallet::KeyCustody;
use crate::domain::entities::{PairingRequest, SessionEvent, SessionGrant, WalletRecord};
use crate::shared::constants::NATIVE_CURRENCY;
use crate::shared::error::WalletError;
use crate::shared::types::{Notice, TransactionReceipt, WalletDetails};
use crate::shared::utils::{format_ether, parse_ether, run_bounded, validate_ethereum_address};
use std::time::Duration;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio_util::sync::CancellationToken;

fn report(notifier: &dyn Notifier, error: &WalletError) {
    log::error!("{}", error);
    notifier.notify(&error.notice());
}

fn missing_key_notice() -> Notice {
    Notice::new("Error", "No private key found in storage")
}

fn resident_wallet(custody: &KeyCustody, notifier: &dyn Notifier) -> Option<WalletRecord> {
    match custody.require_current() {
        Ok(record) => Some(record),
        Err(WalletError::WalletNotFound(_)) => {
            notifier.notify(&missing_key_notice());
            None
        }
        Err(e) => {
            report(notifier, &e);
            None
        }
    }
}

/// Generate a fresh wallet and make it resident
pub fn create_wallet(custody: &KeyCustody, notifier: &dyn Notifier) -> Option<WalletRecord> {
    let _loading = LoadingGuard::new(notifier);
    match custody.generate() {
        Ok(record) => {
            notifier.notify(&Notice::new("Wallet Created", format!("Address: {}", record.address())));
            Some(record)
        }
        Err(e) => {
            report(notifier, &e);
            None
        }
    }
}

/// Import a mnemonic or private key, then show the network and the balance
pub async fn import_wallet(
    custody: &KeyCustody,
    transactions: &TransactionManager,
    input: &str,
    notifier: &dyn Notifier,
    cancel: Option<&CancellationToken>,
) -> Option<WalletDetails> {
    let _loading = LoadingGuard::new(notifier);

    let record = match custody.derive(input) {
        Ok(record) => record,
        Err(WalletError::Validation(detail)) => {
            log::warn!("Rejected wallet import: {}", detail);
            notifier.notify(&Notice::new(
                "Invalid Input",
                "Please provide a valid mnemonic phrase or private key.",
            ));
            return None;
        }
        Err(e) => {
            report(notifier, &e);
            return None;
        }
    };

    let network = match transactions.network_info(cancel).await {
        Ok(network) => network,
        Err(e) => {
            report(notifier, &e);
            return None;
        }
    };
    notifier.notify(&Notice::new(
        "Connected to Network",
        format!("Network Name: {}\nChain ID: {}", network.name, network.chain_id),
    ));

    if let Err(e) = custody.persist(&record) {
        report(notifier, &e);
        return None;
    }
    log::info!("Imported wallet {}", record.address());

    let balance = match transactions.get_balance(record.address(), cancel).await {
        Ok(balance) => balance,
        Err(e) => {
            report(notifier, &e);
            return None;
        }
    };
    let balance_ether = format_ether(balance);
    notifier.notify(&Notice::new(
        "Wallet Imported",
        format!(
            "Wallet Address: {}\nBalance: {} {}",
            record.address(),
            balance_ether,
            NATIVE_CURRENCY
        ),
    ));

    Some(WalletDetails {
        address: record.address().to_string(),
        balance_wei: balance.to_string(),
        balance_ether,
        network_name: network.name,
    })
}

/// Address, balance and network of the resident wallet
///
/// Only failures are notified; the details are for display.
pub async fn load_dashboard(
    custody: &KeyCustody,
    transactions: &TransactionManager,
    notifier: &dyn Notifier,
    cancel: Option<&CancellationToken>,
) -> Option<WalletDetails> {
    let _loading = LoadingGuard::new(notifier);
    let record = resident_wallet(custody, notifier)?;
    transactions
        .wallet_details(&record, cancel)
        .await
        .inspect_err(|e| report(notifier, e))
        .ok()
}

/// Send `amount_ether` to `recipient` from the resident wallet
pub async fn send_funds(
    custody: &KeyCustody,
    transactions: &TransactionManager,
    recipient: &str,
    amount_ether: &str,
    notifier: &dyn Notifier,
    cancel: Option<&CancellationToken>,
) -> Option<TransactionReceipt> {
    let recipient = recipient.trim();
    if validate_ethereum_address(recipient).is_err() {
        notifier.notify(&Notice::new("Invalid Address", "Please provide a valid recipient address."));
        return None;
    }
    let amount_wei = match parse_ether(amount_ether) {
        Ok(wei) if !wei.is_zero() => wei,
        _ => {
            notifier.notify(&Notice::new("Invalid Amount", "Please enter a valid amount to send."));
            return None;
        }
    };

    let _loading = LoadingGuard::new(notifier);
    let record = resident_wallet(custody, notifier)?;
    match transactions
        .send_transaction(recipient, &amount_wei.to_string(), record.private_key(), cancel)
        .await
    {
        Ok(receipt) => {
            notifier.notify(&Notice::new(
                "Success",
                format!("Transaction successful!\nHash: {}", receipt.hash),
            ));
            Some(receipt)
        }
        Err(e) => {
            report(notifier, &e);
            None
        }
    }
}

/// Pair with a scanned code and wait up to `wait` for the session outcome
pub async fn connect_session(
    broker: &SessionBroker,
    code: &str,
    wait: Duration,
    notifier: &dyn Notifier,
    cancel: Option<&CancellationToken>,
) -> Option<SessionGrant> {
    let _loading = LoadingGuard::new(notifier);
    notifier.notify(&Notice::new("Code Scanned!", format!("Data: {}", code.trim())));

    if let Err(e) = broker.connect().await {
        report(notifier, &e);
        return None;
    }
    let mut events = broker.subscribe();
    let request = PairingRequest::new(code);
    if let Err(e) = broker.pair(&request, cancel).await {
        report(notifier, &e);
        return None;
    }

    let outcome = wait_for_outcome(&mut events, request.topic(), wait, cancel).await;
    match outcome {
        Ok(SessionEvent::Approved(grant)) => {
            let peer = grant.peer.as_ref().map(|p| p.name.as_str()).unwrap_or("peer");
            notifier.notify(&Notice::new("Session Approved", format!("Connected to {}", peer)));
            Some(grant)
        }
        Ok(SessionEvent::Failed { error, .. }) => {
            report(notifier, &error);
            None
        }
        Err(e) => {
            report(notifier, &e);
            None
        }
    }
}

/// First outcome for the proposal that arrived on `topic`
///
/// Events from other pairings are skipped; events that carry no topic are
/// taken as ours.
async fn wait_for_outcome(
    events: &mut broadcast::Receiver<SessionEvent>,
    topic: Option<&str>,
    wait: Duration,
    cancel: Option<&CancellationToken>,
) -> Result<SessionEvent, WalletError> {
    run_bounded("session approval", wait, cancel, async {
        loop {
            match events.recv().await {
                Ok(event) => match (topic, event.pairing_topic()) {
                    (Some(ours), Some(theirs)) if ours != theirs => {
                        log::debug!("Ignoring outcome of proposal {} from another pairing", event.proposal_id());
                    }
                    _ => return Ok(event),
                },
                Err(RecvError::Lagged(skipped)) => log::warn!("Missed {} session events", skipped),
                Err(RecvError::Closed) => return Err(WalletError::internal("Session events closed")),
            }
        }
    })
    .await
}
