//! Domain repositories
//! 
//! Capability traits the wallet core depends on. Concrete implementations
//! live in the infrastructure layer or are injected by the embedding shell.

pub mod chain_client;
pub mod pairing_transport;
pub mod code_scanner;
pub mod session_repository;

// Re-export repositories
pub use chain_client::*;
pub use pairing_transport::*;
pub use code_scanner::*;
pub use session_repository::*;
