//! Code scanner port
//!
//! Source of decoded machine-readable codes (QR) from the device camera.

use crate::shared::error::WalletError;
use async_trait::async_trait;

#[async_trait]
pub trait CodeScanner: Send + Sync {
    /// Wait for the next decoded code
    ///
    /// Returns `Ok(None)` once the scanner is closed.
    async fn next_code(&self) -> Result<Option<String>, WalletError>;
}
