//! Validation helpers for HerbChain inputs
//!
//! The ledger itself enforces no schema limits on free-text fields; these
//! checks run at the request boundary and in the client before submission.

use crate::types::Address;

/// Validate moisture content is in the 0-100 range
pub fn validate_moisture_percent(moisture: u8) -> Result<(), &'static str> {
    if moisture > 100 {
        return Err("Moisture content must be between 0 and 100");
    }
    Ok(())
}

/// Moisture range generally considered safe for dried herb storage
pub fn is_ideal_moisture(moisture: u8) -> bool {
    (8..=12).contains(&moisture)
}

/// Validate a QR code hash is usable as a secondary lookup key
pub fn validate_qr_code_hash(hash: &str) -> Result<(), &'static str> {
    if hash.trim().is_empty() {
        return Err("QR code hash cannot be empty");
    }
    Ok(())
}

/// Validate a herb name is present
pub fn validate_herb_name(name: &str) -> Result<(), &'static str> {
    if name.trim().is_empty() {
        return Err("Herb name cannot be empty");
    }
    Ok(())
}

/// Validate an address string is well-formed
pub fn validate_address(address: &str) -> Result<(), &'static str> {
    Address::parse(address).map(|_| ()).map_err(|_| "Invalid address format")
}
