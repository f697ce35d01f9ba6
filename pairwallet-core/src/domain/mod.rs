//! Domain layer - entities and repository ports
//!
//! Entities describe wallet and session state; repositories are the capability
//! traits the core talks to (chain access, pairing transport, code scanning,
//! session persistence).

pub mod entities;
pub mod repositories;

// Re-export domain components
pub use entities::*;
pub use repositories::*;
