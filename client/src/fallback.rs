//! Local fallback store
//!
//! A JSON-file analogue of browser local storage: a flat batch list and a
//! "viewed batch" history, addressable under fixed keys. Supports the same
//! lifecycle operations as the ledger but with no role enforcement and no
//! secondary indexes (linear scans; record counts are expected to be small).
//! Exists purely so the UI is usable without a session; it is not a source
//! of truth.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::{ClientError, ClientResult};
use shared::models::{Batch, CreateBatchRequest};
use shared::types::Address;

/// A consumer-history entry recorded when a batch is viewed
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ViewedEntry {
    pub batch_id: u64,
    pub qr_code_hash: Option<String>,
    pub viewed_at: i64,
}

/// Persisted document shape: fixed keys, JSON-encoded
#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreDocument {
    #[serde(rename = "herbchain_batches", default)]
    batches: Vec<Batch>,
    #[serde(rename = "herbchain_viewed", default)]
    viewed: Vec<ViewedEntry>,
}

/// JSON-file key-value store mirroring the ledger's batch shape
#[derive(Debug, Clone)]
pub struct LocalStore {
    path: PathBuf,
}

impl LocalStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    fn load(&self) -> ClientResult<StoreDocument> {
        if !self.path.exists() {
            return Ok(StoreDocument::default());
        }
        let raw = fs::read_to_string(&self.path)?;
        if raw.trim().is_empty() {
            return Ok(StoreDocument::default());
        }
        Ok(serde_json::from_str(&raw)?)
    }

    fn save(&self, doc: &StoreDocument) -> ClientResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(doc)?)?;
        Ok(())
    }

    /// Create a batch. No role check; ids are allocated by linear scan.
    pub fn create_batch(
        &self,
        farmer: &Address,
        input: CreateBatchRequest,
    ) -> ClientResult<Batch> {
        let mut doc = self.load()?;
        let id = doc.batches.iter().map(|b| b.id).max().unwrap_or(0) + 1;

        let batch = Batch::new(id, farmer.clone(), input, Utc::now().timestamp());
        doc.batches.push(batch.clone());
        self.save(&doc)?;

        Ok(batch)
    }

    /// Approve a pending batch. Same precondition as the ledger, no role check.
    pub fn approve_batch(&self, id: u64, officer: &Address) -> ClientResult<Batch> {
        self.transition(id, |batch| {
            batch
                .approve(officer.clone(), Utc::now().timestamp())
                .map_err(|e| ClientError::InvalidTransition(e.to_string()))
        })
    }

    /// Reject a pending batch with a reason
    pub fn reject_batch(&self, id: u64, officer: &Address, reason: &str) -> ClientResult<Batch> {
        self.transition(id, |batch| {
            batch
                .reject(officer.clone(), reason.to_string(), Utc::now().timestamp())
                .map_err(|e| ClientError::InvalidTransition(e.to_string()))
        })
    }

    /// Process an approved batch, binding its QR code hash. Uniqueness is
    /// enforced by linear scan over the stored batches.
    pub fn process_batch(
        &self,
        id: u64,
        manufacturer: &Address,
        qr_code_hash: &str,
    ) -> ClientResult<Batch> {
        let mut doc = self.load()?;

        if let Some(owner) = doc
            .batches
            .iter()
            .find(|b| b.qr_code_hash.as_deref() == Some(qr_code_hash) && b.id != id)
        {
            return Err(ClientError::DuplicateKey(format!(
                "QR code hash is already registered to batch {}",
                owner.id
            )));
        }

        let batch = doc
            .batches
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or_else(|| ClientError::NotFound(format!("batch {}", id)))?;

        batch
            .process(
                manufacturer.clone(),
                qr_code_hash.to_string(),
                Utc::now().timestamp(),
            )
            .map_err(|e| ClientError::InvalidTransition(e.to_string()))?;

        let updated = batch.clone();
        self.save(&doc)?;
        Ok(updated)
    }

    pub fn batch(&self, id: u64) -> ClientResult<Batch> {
        self.load()?
            .batches
            .into_iter()
            .find(|b| b.id == id)
            .ok_or_else(|| ClientError::NotFound(format!("batch {}", id)))
    }

    pub fn batch_by_qr(&self, qr_code_hash: &str) -> ClientResult<Batch> {
        self.load()?
            .batches
            .into_iter()
            .find(|b| b.qr_code_hash.as_deref() == Some(qr_code_hash))
            .ok_or_else(|| ClientError::NotFound("batch with this QR code".to_string()))
    }

    pub fn all_batches(&self) -> ClientResult<Vec<Batch>> {
        Ok(self.load()?.batches)
    }

    /// Record a consumer view of a batch in the history list
    pub fn record_viewed(&self, batch: &Batch) -> ClientResult<()> {
        let mut doc = self.load()?;
        doc.viewed.push(ViewedEntry {
            batch_id: batch.id,
            qr_code_hash: batch.qr_code_hash.clone(),
            viewed_at: Utc::now().timestamp(),
        });
        self.save(&doc)
    }

    pub fn viewed_history(&self) -> ClientResult<Vec<ViewedEntry>> {
        Ok(self.load()?.viewed)
    }

    fn transition(
        &self,
        id: u64,
        apply: impl FnOnce(&mut Batch) -> ClientResult<()>,
    ) -> ClientResult<Batch> {
        let mut doc = self.load()?;
        let batch = doc
            .batches
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or_else(|| ClientError::NotFound(format!("batch {}", id)))?;

        apply(batch)?;
        let updated = batch.clone();
        self.save(&doc)?;
        Ok(updated)
    }
}
