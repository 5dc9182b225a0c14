//! HTTP middleware for the HerbChain ledger

pub mod auth;

pub use auth::{auth_middleware, AuthIdentity, Caller};
