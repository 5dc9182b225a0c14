//! Identity and role models

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::types::Address;

/// Closed set of role capabilities recognized by the ledger.
///
/// `Consumer` is the implicit role of any identity without a grant; it can
/// only perform reads and is never stored in the registry.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Farmer,
    LabOfficer,
    Manufacturer,
    Admin,
    Consumer,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Farmer => "farmer",
            Role::LabOfficer => "lab_officer",
            Role::Manufacturer => "manufacturer",
            Role::Admin => "admin",
            Role::Consumer => "consumer",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "farmer" => Some(Role::Farmer),
            "lab_officer" => Some(Role::LabOfficer),
            "manufacturer" => Some(Role::Manufacturer),
            "admin" => Some(Role::Admin),
            "consumer" => Some(Role::Consumer),
            _ => None,
        }
    }

    /// Only the three working roles can be granted or revoked by an admin
    pub fn is_grantable(&self) -> bool {
        matches!(self, Role::Farmer | Role::LabOfficer | Role::Manufacturer)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Farmer => write!(f, "Farmer"),
            Role::LabOfficer => write!(f, "Lab Officer"),
            Role::Manufacturer => write!(f, "Manufacturer"),
            Role::Admin => write!(f, "Admin"),
            Role::Consumer => write!(f, "Consumer"),
        }
    }
}

/// Input for registering a new account
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, message = "name cannot be empty"))]
    pub name: String,
    #[validate(length(min = 8, message = "password must be at least 8 characters"))]
    pub password: String,
}

/// Input for logging in
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub address: Address,
    pub password: String,
}

/// Input for refreshing an access token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Tokens returned by register, login, and refresh
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionTokens {
    pub address: Address,
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

/// Input for granting a role capability to an address (admin only)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrantRoleRequest {
    pub address: Address,
    pub role: Role,
}

/// Input for revoking an address's role capability (admin only)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevokeRoleRequest {
    pub address: Address,
}

/// Role lookup response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleInfo {
    pub address: Address,
    pub role: Role,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_string_round_trip() {
        for role in [
            Role::Farmer,
            Role::LabOfficer,
            Role::Manufacturer,
            Role::Admin,
            Role::Consumer,
        ] {
            assert_eq!(Role::from_str(role.as_str()), Some(role));
        }
        assert_eq!(Role::from_str("owner"), None);
    }

    #[test]
    fn only_working_roles_are_grantable() {
        assert!(Role::Farmer.is_grantable());
        assert!(Role::LabOfficer.is_grantable());
        assert!(Role::Manufacturer.is_grantable());
        assert!(!Role::Admin.is_grantable());
        assert!(!Role::Consumer.is_grantable());
    }
}
