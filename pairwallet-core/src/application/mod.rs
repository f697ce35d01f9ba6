//! Application layer - screen-level flows and their notification port
//!
//! Use cases orchestrate key custody, the chain and the session broker and
//! report every outcome through a [`Notifier`]. Nothing here returns an error
//! to the caller; failures become notices.

pub mod notifications;
pub mod use_cases;

pub use notifications::*;
pub use use_cases::*;
