//! Role registry: maps ledger addresses to role capabilities
//!
//! Consulted by every mutating ledger operation through a single
//! permission-check entry point. Grants and revokes are admin-only.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::error::{AppError, AppResult};
use shared::models::Role;
use shared::types::Address;

/// Role registry service
#[derive(Clone)]
pub struct RoleRegistry {
    inner: Arc<RwLock<HashMap<Address, Role>>>,
}

impl RoleRegistry {
    /// Create a registry with the default-admin identity seeded
    pub fn new(admin: Address) -> Self {
        let mut roles = HashMap::new();
        roles.insert(admin, Role::Admin);
        Self {
            inner: Arc::new(RwLock::new(roles)),
        }
    }

    /// Seed a working role at startup (bypasses the admin check; only
    /// called while wiring the application from configuration)
    pub async fn seed(&self, address: Address, role: Role) {
        self.inner.write().await.insert(address, role);
    }

    /// Role currently held by an address; `Consumer` when no grant exists
    pub async fn role_of(&self, address: &Address) -> Role {
        self.inner
            .read()
            .await
            .get(address)
            .copied()
            .unwrap_or(Role::Consumer)
    }

    /// The uniform permission check: fail with PermissionDenied unless the
    /// caller holds the required role capability
    pub async fn require_role(
        &self,
        caller: &Address,
        required: Role,
        action: &str,
    ) -> AppResult<()> {
        let held = self.role_of(caller).await;
        if held == required {
            return Ok(());
        }
        Err(AppError::PermissionDenied {
            action: action.to_string(),
            required: required.to_string(),
        })
    }

    /// Grant a working role to an address (admin only)
    pub async fn grant(&self, caller: &Address, address: Address, role: Role) -> AppResult<()> {
        self.require_role(caller, Role::Admin, "grant role").await?;

        if !role.is_grantable() {
            return Err(AppError::Validation {
                field: "role".to_string(),
                message: format!("{} is not a grantable role", role),
            });
        }

        self.inner.write().await.insert(address.clone(), role);
        tracing::info!(address = %address, role = %role, "role granted");
        Ok(())
    }

    /// Revoke an address's role capability (admin only). Revoking an address
    /// without a grant is a no-op; revoking an admin is not permitted.
    pub async fn revoke(&self, caller: &Address, address: &Address) -> AppResult<()> {
        self.require_role(caller, Role::Admin, "revoke role").await?;

        let mut roles = self.inner.write().await;
        if roles.get(address) == Some(&Role::Admin) {
            return Err(AppError::Validation {
                field: "address".to_string(),
                message: "cannot revoke an admin identity".to_string(),
            });
        }

        roles.remove(address);
        tracing::info!(address = %address, "role revoked");
        Ok(())
    }
}
