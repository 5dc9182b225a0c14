//! Common value types used across the platform

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A ledger identity: `0x` followed by 40 lowercase hex characters.
///
/// Addresses are opaque to the application; the ledger only ever compares
/// them for equality and uses them as index keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(String);

/// Error raised when a string is not a well-formed address
#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid address: {0}")]
pub struct AddressError(pub String);

impl Address {
    /// Parse and normalize an address string (case-insensitive hex accepted)
    pub fn parse(s: &str) -> Result<Self, AddressError> {
        let s = s.trim();
        let hex = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .ok_or_else(|| AddressError(format!("missing 0x prefix in {:?}", s)))?;

        if hex.len() != 40 {
            return Err(AddressError(format!(
                "expected 40 hex characters, got {}",
                hex.len()
            )));
        }
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(AddressError(format!("non-hex character in {:?}", s)));
        }

        Ok(Self(format!("0x{}", hex.to_ascii_lowercase())))
    }

    /// Build an address from raw bytes (first 20 bytes are used)
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let mut out = String::with_capacity(42);
        out.push_str("0x");
        for b in bytes.iter().take(20) {
            out.push_str(&format!("{:02x}", b));
        }
        Self(out)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
