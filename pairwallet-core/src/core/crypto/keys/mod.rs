//! Key material for the wallet core
//!
//! BIP-39 phrases, BIP-32 derivation along the Ethereum path, and the
//! zeroizing containers that hold secrets while they are in use.

pub mod key_manager;
pub mod secure_private_key;
pub mod secure_seed_phrase;

pub use key_manager::*;
pub use secure_private_key::*;
pub use secure_seed_phrase::*;
