//! Channel-fed code scanner
//!
//! The camera pipeline lives in the mobile shell; it pushes each decoded
//! code through a [`ScanFeed`] and the core reads them as a [`CodeScanner`].

use crate::domain::repositories::CodeScanner;
use crate::shared::error::WalletError;
use async_trait::async_trait;
use tokio::sync::{mpsc, Mutex};

const SCAN_BUFFER: usize = 8;

pub struct ChannelScanner {
    codes: Mutex<mpsc::Receiver<String>>,
}

/// Producer side handed to the camera pipeline
#[derive(Clone)]
pub struct ScanFeed {
    tx: mpsc::Sender<String>,
}

impl ChannelScanner {
    pub fn new() -> (Self, ScanFeed) {
        let (tx, rx) = mpsc::channel(SCAN_BUFFER);
        (Self { codes: Mutex::new(rx) }, ScanFeed { tx })
    }
}

impl ScanFeed {
    /// Push a decoded code; fails once the scanner is dropped
    pub async fn push(&self, code: impl Into<String>) -> Result<(), WalletError> {
        self.tx
            .send(code.into())
            .await
            .map_err(|_| WalletError::internal("Code scanner is closed"))
    }
}

#[async_trait]
impl CodeScanner for ChannelScanner {
    async fn next_code(&self) -> Result<Option<String>, WalletError> {
        Ok(self.codes.lock().await.recv().await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_codes_arrive_in_order_then_close() {
        let (scanner, feed) = ChannelScanner::new();
        feed.push("wc:one@2").await.expect("push");
        feed.push("wc:two@2").await.expect("push");
        drop(feed);

        assert_eq!(scanner.next_code().await.expect("scan").as_deref(), Some("wc:one@2"));
        assert_eq!(scanner.next_code().await.expect("scan").as_deref(), Some("wc:two@2"));
        assert_eq!(scanner.next_code().await.expect("scan"), None);
    }
}
