//! Batch Ledger: the authoritative store of herb batches
//!
//! `LedgerState` is the pure state machine: an append-only record store plus
//! incrementally maintained secondary indexes (by farmer, by status, by QR
//! hash). It performs no role checks and takes timestamps as arguments, so it
//! is fully deterministic under test.
//!
//! `LedgerService` wraps the state in a single-writer lock, consults the role
//! registry before every mutating call, and publishes a transition event
//! after each successful mutation.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::RwLock;

use crate::error::{AppError, AppResult};
use crate::services::events::EventBus;
use crate::services::registry::RoleRegistry;
use shared::models::{Batch, BatchEvent, CreateBatchRequest, Role};
use shared::types::Address;

/// Pure ledger state machine
#[derive(Debug, Default)]
pub struct LedgerState {
    /// Append-only record store keyed by batch id
    batches: BTreeMap<u64, Batch>,
    /// Id counter; also the total number of batches ever created
    total: u64,
    /// Per-farmer id index, append order
    by_farmer: HashMap<Address, Vec<u64>>,
    /// Ids currently awaiting review
    pending: Vec<u64>,
    /// Ids approved and awaiting processing (disjoint from processed)
    approved: Vec<u64>,
    /// QR hash secondary key, unique once registered
    by_qr: HashMap<String, u64>,
}

impl LedgerState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the next sequential id and store a Pending batch
    pub fn create_batch(
        &mut self,
        farmer: Address,
        input: CreateBatchRequest,
        now: i64,
    ) -> Batch {
        self.total += 1;
        let id = self.total;

        let batch = Batch::new(id, farmer.clone(), input, now);
        self.batches.insert(id, batch.clone());
        self.by_farmer.entry(farmer).or_default().push(id);
        self.pending.push(id);

        batch
    }

    /// Pending -> Approved; moves the id from the pending to the approved index
    pub fn approve_batch(&mut self, id: u64, officer: Address, now: i64) -> AppResult<Batch> {
        let batch = self
            .batches
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("Batch {}", id)))?;

        batch
            .approve(officer, now)
            .map_err(|e| AppError::from_transition(id, e))?;

        self.pending.retain(|&p| p != id);
        self.approved.push(id);

        Ok(batch.clone())
    }

    /// Pending -> Rejected; removes the id from the pending index
    pub fn reject_batch(
        &mut self,
        id: u64,
        officer: Address,
        reason: String,
        now: i64,
    ) -> AppResult<Batch> {
        let batch = self
            .batches
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("Batch {}", id)))?;

        batch
            .reject(officer, reason, now)
            .map_err(|e| AppError::from_transition(id, e))?;

        self.pending.retain(|&p| p != id);

        Ok(batch.clone())
    }

    /// Approved -> Processed; registers the QR secondary key and removes the
    /// id from the approved index. All preconditions (existence, status, QR
    /// uniqueness) are checked before any field mutates.
    pub fn process_batch(
        &mut self,
        id: u64,
        manufacturer: Address,
        qr_code_hash: String,
        now: i64,
    ) -> AppResult<Batch> {
        if let Some(&owner) = self.by_qr.get(&qr_code_hash) {
            if owner != id {
                return Err(AppError::DuplicateKey(format!(
                    "QR code hash is already registered to batch {}",
                    owner
                )));
            }
        }

        let batch = self
            .batches
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("Batch {}", id)))?;

        batch
            .process(manufacturer, qr_code_hash.clone(), now)
            .map_err(|e| AppError::from_transition(id, e))?;

        self.by_qr.insert(qr_code_hash, id);
        self.approved.retain(|&a| a != id);

        Ok(batch.clone())
    }

    pub fn batch(&self, id: u64) -> AppResult<&Batch> {
        self.batches
            .get(&id)
            .ok_or_else(|| AppError::NotFound(format!("Batch {}", id)))
    }

    pub fn batch_by_qr(&self, qr_code_hash: &str) -> AppResult<&Batch> {
        let id = self
            .by_qr
            .get(qr_code_hash)
            .ok_or_else(|| AppError::NotFound("Batch with this QR code".to_string()))?;
        self.batch(*id)
    }

    pub fn farmer_batches(&self, farmer: &Address) -> Vec<u64> {
        self.by_farmer.get(farmer).cloned().unwrap_or_default()
    }

    pub fn pending_batches(&self) -> Vec<u64> {
        self.pending.clone()
    }

    pub fn approved_batches(&self) -> Vec<u64> {
        self.approved.clone()
    }

    pub fn total_batches(&self) -> u64 {
        self.total
    }
}

/// Batch Ledger service: role gate + single-writer store + event publish
#[derive(Clone)]
pub struct LedgerService {
    state: Arc<RwLock<LedgerState>>,
    registry: RoleRegistry,
    events: EventBus,
}

impl LedgerService {
    pub fn new(registry: RoleRegistry, events: EventBus) -> Self {
        Self {
            state: Arc::new(RwLock::new(LedgerState::new())),
            registry,
            events,
        }
    }

    /// Create a batch. Caller must hold the Farmer role.
    ///
    /// The role snapshot is taken inside the writer critical section, as in
    /// every mutating operation below: a concurrent revoke orders entirely
    /// before or entirely after the operation, never between the role check
    /// and the mutation.
    pub async fn create_batch(
        &self,
        caller: &Address,
        input: CreateBatchRequest,
    ) -> AppResult<Batch> {
        let mut state = self.state.write().await;
        self.registry
            .require_role(caller, Role::Farmer, "create batch")
            .await?;

        let now = Utc::now().timestamp();
        let batch = state.create_batch(caller.clone(), input, now);
        drop(state);

        tracing::info!(batch_id = batch.id, farmer = %caller, "batch created");
        self.events.publish(BatchEvent::Created {
            batch_id: batch.id,
            actor: caller.clone(),
        });

        Ok(batch)
    }

    /// Approve a pending batch. Caller must hold the LabOfficer role.
    pub async fn approve_batch(&self, caller: &Address, id: u64) -> AppResult<Batch> {
        let mut state = self.state.write().await;
        self.registry
            .require_role(caller, Role::LabOfficer, "approve batch")
            .await?;

        let now = Utc::now().timestamp();
        let batch = state.approve_batch(id, caller.clone(), now)?;
        drop(state);

        tracing::info!(batch_id = id, officer = %caller, "batch approved");
        self.events.publish(BatchEvent::Approved {
            batch_id: id,
            actor: caller.clone(),
        });

        Ok(batch)
    }

    /// Reject a pending batch with a reason. Caller must hold the LabOfficer role.
    pub async fn reject_batch(
        &self,
        caller: &Address,
        id: u64,
        reason: String,
    ) -> AppResult<Batch> {
        let mut state = self.state.write().await;
        self.registry
            .require_role(caller, Role::LabOfficer, "reject batch")
            .await?;

        let now = Utc::now().timestamp();
        let batch = state.reject_batch(id, caller.clone(), reason, now)?;
        drop(state);

        tracing::info!(batch_id = id, officer = %caller, "batch rejected");
        self.events.publish(BatchEvent::Rejected {
            batch_id: id,
            actor: caller.clone(),
        });

        Ok(batch)
    }

    /// Process an approved batch, binding its unique QR code hash. Caller
    /// must hold the Manufacturer role.
    pub async fn process_batch(
        &self,
        caller: &Address,
        id: u64,
        qr_code_hash: String,
    ) -> AppResult<Batch> {
        let mut state = self.state.write().await;
        self.registry
            .require_role(caller, Role::Manufacturer, "process batch")
            .await?;

        let now = Utc::now().timestamp();
        let batch = state.process_batch(id, caller.clone(), qr_code_hash, now)?;
        drop(state);

        tracing::info!(batch_id = id, manufacturer = %caller, "batch processed");
        self.events.publish(BatchEvent::Processed {
            batch_id: id,
            actor: caller.clone(),
        });

        Ok(batch)
    }

    pub async fn batch(&self, id: u64) -> AppResult<Batch> {
        self.state.read().await.batch(id).cloned()
    }

    pub async fn batch_by_qr(&self, qr_code_hash: &str) -> AppResult<Batch> {
        self.state.read().await.batch_by_qr(qr_code_hash).cloned()
    }

    pub async fn farmer_batches(&self, farmer: &Address) -> Vec<u64> {
        self.state.read().await.farmer_batches(farmer)
    }

    pub async fn pending_batches(&self) -> Vec<u64> {
        self.state.read().await.pending_batches()
    }

    pub async fn approved_batches(&self) -> Vec<u64> {
        self.state.read().await.approved_batches()
    }

    pub async fn total_batches(&self) -> u64 {
        self.state.read().await.total_batches()
    }
}
