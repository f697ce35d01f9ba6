//! Shared configuration, errors, types, constants and helpers
//!
//! Everything here is used across layers; none of it depends on the core.

pub mod config;
pub mod constants;
pub mod error;
pub mod types;
pub mod utils;

// `config` is also the name of the configuration crate, so only its types are re-exported
pub use self::config::{GrantPolicy, MetadataConfig, WalletCoreConfig};
pub use constants::*;
pub use error::*;
pub use types::*;
pub use utils::*;
