//! Batch ledger HTTP handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use validator::Validate;

use crate::error::{validation_error, AppError, AppResult};
use crate::middleware::Caller;
use crate::AppState;
use shared::models::{
    Batch, BatchStatus, CreateBatchRequest, ProcessBatchRequest, RejectBatchRequest,
};
use shared::types::Address;

/// Query parameters for the batch index reads
#[derive(Debug, Deserialize)]
pub struct BatchListQuery {
    pub status: Option<String>,
    pub farmer: Option<String>,
}

/// Create a new batch (Farmer role)
pub async fn create_batch(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Json(input): Json<CreateBatchRequest>,
) -> AppResult<impl IntoResponse> {
    input.validate().map_err(|e| validation_error(&e))?;

    let batch = state.ledger.create_batch(&caller, input).await?;
    Ok((StatusCode::CREATED, Json(batch)))
}

/// Get a batch by id (public)
pub async fn get_batch(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> AppResult<Json<Batch>> {
    let batch = state.ledger.batch(id).await?;
    Ok(Json(batch))
}

/// Index reads: ids by status (pending/approved) or by farmer (public)
pub async fn list_batches(
    State(state): State<AppState>,
    Query(query): Query<BatchListQuery>,
) -> AppResult<Json<serde_json::Value>> {
    let ids = match (query.farmer.as_deref(), query.status.as_deref()) {
        (Some(farmer), None) => {
            let address = Address::parse(farmer).map_err(|e| AppError::Validation {
                field: "farmer".to_string(),
                message: e.to_string(),
            })?;
            state.ledger.farmer_batches(&address).await
        }
        (None, Some(status)) => match BatchStatus::from_str(status) {
            Some(BatchStatus::Pending) => state.ledger.pending_batches().await,
            Some(BatchStatus::Approved) => state.ledger.approved_batches().await,
            _ => {
                return Err(AppError::Validation {
                    field: "status".to_string(),
                    message: "only pending and approved index reads are maintained".to_string(),
                })
            }
        },
        _ => {
            return Err(AppError::Validation {
                field: "query".to_string(),
                message: "specify exactly one of ?status= or ?farmer=".to_string(),
            })
        }
    };

    Ok(Json(serde_json::json!({ "ids": ids })))
}

/// Total number of batches ever created (public)
pub async fn get_batch_count(State(state): State<AppState>) -> Json<serde_json::Value> {
    let total = state.ledger.total_batches().await;
    Json(serde_json::json!({ "total": total }))
}

/// Approve a pending batch (LabOfficer role)
pub async fn approve_batch(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Path(id): Path<u64>,
) -> AppResult<Json<Batch>> {
    let batch = state.ledger.approve_batch(&caller, id).await?;
    Ok(Json(batch))
}

/// Reject a pending batch with a reason (LabOfficer role)
pub async fn reject_batch(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Path(id): Path<u64>,
    Json(input): Json<RejectBatchRequest>,
) -> AppResult<Json<Batch>> {
    input.validate().map_err(|e| validation_error(&e))?;

    let batch = state.ledger.reject_batch(&caller, id, input.reason).await?;
    Ok(Json(batch))
}

/// Process an approved batch, binding its QR code hash (Manufacturer role)
pub async fn process_batch(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Path(id): Path<u64>,
    Json(input): Json<ProcessBatchRequest>,
) -> AppResult<Json<Batch>> {
    input.validate().map_err(|e| validation_error(&e))?;

    let batch = state
        .ledger
        .process_batch(&caller, id, input.qr_code_hash)
        .await?;
    Ok(Json(batch))
}

/// Get a batch by QR code hash (public endpoint for consumer scanning)
pub async fn trace_batch(
    State(state): State<AppState>,
    Path(qr_code_hash): Path<String>,
) -> AppResult<Json<Batch>> {
    let batch = state.ledger.batch_by_qr(&qr_code_hash).await?;
    Ok(Json(batch))
}
