//! Transaction signatures for the wallet core
//!
//! EIP-155 legacy transactions signed with a recoverable secp256k1 signature.

pub mod signature_manager;

pub use signature_manager::*;
