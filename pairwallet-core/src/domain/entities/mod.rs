//! Domain entities and value objects
//!
//! This module contains the core domain entities and value objects
//! that represent the business concepts in the wallet system.

pub mod wallet;
pub mod session;

// Re-export entities
pub use wallet::*;
pub use session::*;
