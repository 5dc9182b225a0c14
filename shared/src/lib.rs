//! Shared types and models for HerbChain
//!
//! This crate contains types shared between the ledger backend, the client
//! adapter, and other components of the system.

pub mod models;
pub mod types;
pub mod validation;

pub use models::*;
pub use types::*;
pub use validation::*;
