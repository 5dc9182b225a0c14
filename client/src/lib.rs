//! HerbChain client adapter
//!
//! Wraps the ledger's HTTP surface in typed calls, converts ledger-native
//! encodings (epoch seconds, status ordinals) into application-level types,
//! and falls back to a JSON-file store when no session is available.

pub mod adapter;
pub mod error;
pub mod fallback;

pub use adapter::{BatchSource, BatchView, EventSubscription, LedgerClient};
pub use error::ClientError;
pub use fallback::{LocalStore, ViewedEntry};
