//! Client-side error types
//!
//! API failures carry the ledger's reason string verbatim; the presentation
//! layer decides whether to surface it or fall back to local data.

use thiserror::Error;

/// Errors surfaced by the client adapter and fallback store
#[derive(Debug, Error)]
pub enum ClientError {
    /// Failure reported by the ledger API, propagated verbatim
    #[error("{code}: {message}")]
    Api { code: String, message: String },

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("decode error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("storage error: {0}")]
    Storage(String),

    // Fallback-store failures mirror the ledger taxonomy so the
    // presentation layer handles both sources uniformly
    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid transition: {0}")]
    InvalidTransition(String),

    #[error("duplicate key: {0}")]
    DuplicateKey(String),
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        ClientError::Storage(err.to_string())
    }
}

/// Result type alias for client operations
pub type ClientResult<T> = Result<T, ClientError>;
