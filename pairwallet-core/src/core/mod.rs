//! Core wallet functionality
//! 
//! This module contains the core wallet functionality including
//! key custody, cryptography, transactions, and session pairing.

pub mod wallet;
pub mod crypto;
pub mod transactions;
pub mod session;
