//! Role registry HTTP handlers

use axum::{
    extract::{Path, State},
    Json,
};

use crate::error::{AppError, AppResult};
use crate::middleware::Caller;
use crate::AppState;
use shared::models::{GrantRoleRequest, RevokeRoleRequest, RoleInfo};
use shared::types::Address;

/// Grant a working role to an address (Admin role)
pub async fn grant_role(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Json(body): Json<GrantRoleRequest>,
) -> AppResult<Json<RoleInfo>> {
    state
        .registry
        .grant(&caller, body.address.clone(), body.role)
        .await?;

    Ok(Json(RoleInfo {
        address: body.address,
        role: body.role,
    }))
}

/// Revoke an address's role capability (Admin role)
pub async fn revoke_role(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Json(body): Json<RevokeRoleRequest>,
) -> AppResult<Json<serde_json::Value>> {
    state.registry.revoke(&caller, &body.address).await?;
    Ok(Json(serde_json::json!({ "revoked": body.address })))
}

/// Look up the role held by an address (public)
pub async fn get_role(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> AppResult<Json<RoleInfo>> {
    let address = Address::parse(&address).map_err(|e| AppError::Validation {
        field: "address".to_string(),
        message: e.to_string(),
    })?;

    let role = state.registry.role_of(&address).await;
    Ok(Json(RoleInfo { address, role }))
}
