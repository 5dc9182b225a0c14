//! Authentication handlers

use axum::{extract::State, http::StatusCode, Json};
use validator::Validate;

use crate::error::{validation_error, AppError};
use crate::AppState;
use shared::models::{LoginRequest, RefreshRequest, RegisterRequest, SessionTokens};

/// Register endpoint handler: derives a fresh ledger address for the account
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<SessionTokens>), AppError> {
    body.validate().map_err(|e| validation_error(&e))?;

    let session = state.auth.register(&body.name, &body.password).await?;
    Ok((StatusCode::CREATED, Json(session)))
}

/// Login endpoint handler
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<SessionTokens>, AppError> {
    let session = state.auth.login(&body.address, &body.password).await?;
    Ok(Json(session))
}

/// Token refresh endpoint handler
pub async fn refresh(
    State(state): State<AppState>,
    Json(body): Json<RefreshRequest>,
) -> Result<Json<SessionTokens>, AppError> {
    let session = state.auth.refresh(&body.refresh_token).await?;
    Ok(Json(session))
}
