//! Herb batch model and lifecycle transitions

use serde::{Deserialize, Serialize};
use thiserror::Error;
use validator::Validate;

use crate::types::Address;

/// Status of a batch in the traceability workflow
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum BatchStatus {
    Pending,
    Approved,
    Rejected,
    Processed,
}

impl BatchStatus {
    /// Stable wire ordinal used by the ledger's native encoding
    pub fn ordinal(self) -> u8 {
        match self {
            BatchStatus::Pending => 0,
            BatchStatus::Approved => 1,
            BatchStatus::Rejected => 2,
            BatchStatus::Processed => 3,
        }
    }

    pub fn from_ordinal(value: u8) -> Option<Self> {
        match value {
            0 => Some(BatchStatus::Pending),
            1 => Some(BatchStatus::Approved),
            2 => Some(BatchStatus::Rejected),
            3 => Some(BatchStatus::Processed),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BatchStatus::Pending => "pending",
            BatchStatus::Approved => "approved",
            BatchStatus::Rejected => "rejected",
            BatchStatus::Processed => "processed",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(BatchStatus::Pending),
            "approved" => Some(BatchStatus::Approved),
            "rejected" => Some(BatchStatus::Rejected),
            "processed" => Some(BatchStatus::Processed),
            _ => None,
        }
    }
}

impl std::fmt::Display for BatchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BatchStatus::Pending => write!(f, "Pending"),
            BatchStatus::Approved => write!(f, "Approved"),
            BatchStatus::Rejected => write!(f, "Rejected"),
            BatchStatus::Processed => write!(f, "Processed"),
        }
    }
}

/// Error raised by an attempted lifecycle transition that the current
/// status does not permit
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("batch cannot be reviewed from status {0}")]
    NotReviewable(BatchStatus),

    #[error("batch cannot be processed from status {0}")]
    NotProcessable(BatchStatus),
}

/// A single recorded unit of harvested herb material tracked through the
/// workflow. All creation-time attributes are immutable; only the transition
/// operations below mutate a batch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Batch {
    /// Positive sequential id assigned by the ledger at creation
    pub id: u64,
    /// Identity of the creating farmer, fixed at creation
    pub farmer: Address,
    pub herb_name: String,
    pub location: String,
    /// Moisture content at harvest, 0-100
    pub moisture_percent: u8,
    /// Opaque content reference for the harvest photo
    pub photo_hash: String,
    pub notes: String,
    pub status: BatchStatus,
    /// Set only on transition to Rejected
    pub rejection_reason: Option<String>,
    /// Set only on transition to Processed; globally unique secondary key
    pub qr_code_hash: Option<String>,
    /// Lab officer that approved or rejected the batch
    pub lab_officer: Option<Address>,
    /// Manufacturer that processed the batch
    pub manufacturer: Option<Address>,
    /// Epoch seconds, ledger-native encoding
    pub created_at: i64,
    pub approved_at: Option<i64>,
    pub rejected_at: Option<i64>,
    pub processed_at: Option<i64>,
}

impl Batch {
    /// Build a freshly created batch in the sole initial state
    pub fn new(id: u64, farmer: Address, input: CreateBatchRequest, created_at: i64) -> Self {
        Self {
            id,
            farmer,
            herb_name: input.herb_name,
            location: input.location,
            moisture_percent: input.moisture_percent,
            photo_hash: input.photo_hash,
            notes: input.notes,
            status: BatchStatus::Pending,
            rejection_reason: None,
            qr_code_hash: None,
            lab_officer: None,
            manufacturer: None,
            created_at,
            approved_at: None,
            rejected_at: None,
            processed_at: None,
        }
    }

    /// Pending -> Approved. Records the reviewing lab officer and timestamp.
    pub fn approve(&mut self, officer: Address, at: i64) -> Result<(), TransitionError> {
        if self.status != BatchStatus::Pending {
            return Err(TransitionError::NotReviewable(self.status));
        }
        self.status = BatchStatus::Approved;
        self.lab_officer = Some(officer);
        self.approved_at = Some(at);
        Ok(())
    }

    /// Pending -> Rejected. Records the reviewing lab officer, the reason,
    /// and the rejection timestamp.
    pub fn reject(
        &mut self,
        officer: Address,
        reason: String,
        at: i64,
    ) -> Result<(), TransitionError> {
        if self.status != BatchStatus::Pending {
            return Err(TransitionError::NotReviewable(self.status));
        }
        self.status = BatchStatus::Rejected;
        self.lab_officer = Some(officer);
        self.rejection_reason = Some(reason);
        self.rejected_at = Some(at);
        Ok(())
    }

    /// Approved -> Processed. Records the manufacturer, the QR reference,
    /// and the processing timestamp. QR uniqueness is enforced by the store,
    /// not here.
    pub fn process(
        &mut self,
        manufacturer: Address,
        qr_code_hash: String,
        at: i64,
    ) -> Result<(), TransitionError> {
        if self.status != BatchStatus::Approved {
            return Err(TransitionError::NotProcessable(self.status));
        }
        self.status = BatchStatus::Processed;
        self.manufacturer = Some(manufacturer);
        self.qr_code_hash = Some(qr_code_hash);
        self.processed_at = Some(at);
        Ok(())
    }
}

/// Input for creating a batch
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateBatchRequest {
    #[validate(length(min = 1, message = "herb name cannot be empty"))]
    pub herb_name: String,
    pub location: String,
    #[validate(range(max = 100, message = "moisture must be between 0 and 100"))]
    pub moisture_percent: u8,
    pub photo_hash: String,
    #[serde(default)]
    pub notes: String,
}

/// Input for rejecting a batch
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RejectBatchRequest {
    #[validate(length(min = 1, message = "rejection reason cannot be empty"))]
    pub reason: String,
}

/// Input for processing a batch
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ProcessBatchRequest {
    #[validate(length(min = 1, message = "QR code hash cannot be empty"))]
    pub qr_code_hash: String,
}

/// Transition notification emitted by the ledger after each successful
/// mutating operation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum BatchEvent {
    Created { batch_id: u64, actor: Address },
    Approved { batch_id: u64, actor: Address },
    Rejected { batch_id: u64, actor: Address },
    Processed { batch_id: u64, actor: Address },
}

impl BatchEvent {
    pub fn name(&self) -> &'static str {
        match self {
            BatchEvent::Created { .. } => "created",
            BatchEvent::Approved { .. } => "approved",
            BatchEvent::Rejected { .. } => "rejected",
            BatchEvent::Processed { .. } => "processed",
        }
    }

    pub fn batch_id(&self) -> u64 {
        match self {
            BatchEvent::Created { batch_id, .. }
            | BatchEvent::Approved { batch_id, .. }
            | BatchEvent::Rejected { batch_id, .. }
            | BatchEvent::Processed { batch_id, .. } => *batch_id,
        }
    }

    pub fn actor(&self) -> &Address {
        match self {
            BatchEvent::Created { actor, .. }
            | BatchEvent::Approved { actor, .. }
            | BatchEvent::Rejected { actor, .. }
            | BatchEvent::Processed { actor, .. } => actor,
        }
    }
}
