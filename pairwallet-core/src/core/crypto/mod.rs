//! Cryptographic functionality for the wallet core
//! 
//! Key generation and derivation, and ECDSA signatures for transactions and
//! messages. Primitives come from `secp256k1`, `bip39`, `bip32` and `sha3`.

pub mod keys;
pub mod signatures;

// Re-export all public items from submodules
pub use keys::*;
pub use signatures::*;
