//! Infrastructure layer - platform-specific implementations
//!
//! This module contains platform-specific implementations and external integrations
//! for the wallet system: key-value storage, the JSON-RPC chain client, and the
//! in-process pairing transport and code scanner.

pub mod platform;
pub mod rpc;
pub mod loopback;
pub mod scanner;

// Re-export infrastructure components
pub use platform::*;
pub use rpc::*;
pub use loopback::*;
pub use scanner::*;
