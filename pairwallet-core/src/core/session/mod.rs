//! Pairing and session approval
//!
//! [`SessionBroker`] is the entry point; [`ConnectionHolder`] owns the relay
//! connection and [`ProposalHandler`] answers session proposals.

pub mod connection;
pub mod proposal;
pub mod broker;

pub use connection::*;
pub use proposal::*;
pub use broker::*;
