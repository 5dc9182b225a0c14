//! Client adapter over the ledger's HTTP surface
//!
//! Translates UI actions into ledger calls, normalizes ledger-native
//! encodings (epoch seconds, status ordinals) into display-ready types, and
//! multiplexes between the remote ledger and the local fallback store.
//! Failed calls surface the ledger's reason string verbatim; there is no
//! retry logic here.

use chrono::{DateTime, Utc};
use futures::StreamExt;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::{ClientError, ClientResult};
use crate::fallback::LocalStore;
use shared::models::{Batch, BatchEvent, BatchStatus, CreateBatchRequest, SessionTokens};
use shared::types::Address;

/// A batch normalized for presentation: timestamps as date objects and the
/// status ordinal resolved to a display string
#[derive(Debug, Clone, PartialEq)]
pub struct BatchView {
    pub id: u64,
    pub farmer: Address,
    pub herb_name: String,
    pub location: String,
    pub moisture_percent: u8,
    pub photo_hash: String,
    pub notes: String,
    pub status: BatchStatus,
    pub status_label: String,
    pub rejection_reason: Option<String>,
    pub qr_code_hash: Option<String>,
    pub lab_officer: Option<Address>,
    pub manufacturer: Option<Address>,
    pub created_at: DateTime<Utc>,
    pub approved_at: Option<DateTime<Utc>>,
    pub rejected_at: Option<DateTime<Utc>>,
    pub processed_at: Option<DateTime<Utc>>,
}

fn seconds_to_datetime(secs: i64) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(secs, 0).unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}

impl From<Batch> for BatchView {
    fn from(batch: Batch) -> Self {
        Self {
            id: batch.id,
            farmer: batch.farmer,
            herb_name: batch.herb_name,
            location: batch.location,
            moisture_percent: batch.moisture_percent,
            photo_hash: batch.photo_hash,
            notes: batch.notes,
            status: batch.status,
            status_label: batch.status.to_string(),
            rejection_reason: batch.rejection_reason,
            qr_code_hash: batch.qr_code_hash,
            lab_officer: batch.lab_officer,
            manufacturer: batch.manufacturer,
            created_at: seconds_to_datetime(batch.created_at),
            approved_at: batch.approved_at.map(seconds_to_datetime),
            rejected_at: batch.rejected_at.map(seconds_to_datetime),
            processed_at: batch.processed_at.map(seconds_to_datetime),
        }
    }
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    code: String,
    message: String,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Deserialize)]
struct IdsResponse {
    ids: Vec<u64>,
}

#[derive(Deserialize)]
struct TotalResponse {
    total: u64,
}

/// Typed HTTP client for the ledger API
#[derive(Debug, Clone)]
pub struct LedgerClient {
    http: reqwest::Client,
    base_url: String,
    access_token: Option<String>,
}

impl LedgerClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            access_token: None,
        }
    }

    /// Attach a bearer token for mutating calls
    pub fn with_token(mut self, access_token: impl Into<String>) -> Self {
        self.access_token = Some(access_token.into());
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/v1{}", self.base_url, path)
    }

    fn authorize(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.access_token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    async fn decode<T: DeserializeOwned>(resp: reqwest::Response) -> ClientResult<T> {
        if resp.status().is_success() {
            return Ok(resp.json().await?);
        }

        let status = resp.status();
        match resp.json::<ApiErrorBody>().await {
            Ok(body) => Err(ClientError::Api {
                code: body.error.code,
                message: body.error.message,
            }),
            Err(_) => Err(ClientError::Api {
                code: status.as_u16().to_string(),
                message: "request failed".to_string(),
            }),
        }
    }

    /// Register a new account and receive a session
    pub async fn register(&self, name: &str, password: &str) -> ClientResult<SessionTokens> {
        let resp = self
            .http
            .post(self.url("/auth/register"))
            .json(&serde_json::json!({ "name": name, "password": password }))
            .send()
            .await?;
        Self::decode(resp).await
    }

    /// Login with address and password
    pub async fn login(&self, address: &Address, password: &str) -> ClientResult<SessionTokens> {
        let resp = self
            .http
            .post(self.url("/auth/login"))
            .json(&serde_json::json!({ "address": address, "password": password }))
            .send()
            .await?;
        Self::decode(resp).await
    }

    pub async fn create_batch(&self, input: &CreateBatchRequest) -> ClientResult<BatchView> {
        let resp = self
            .authorize(self.http.post(self.url("/batches")))
            .json(input)
            .send()
            .await?;
        Ok(Self::decode::<Batch>(resp).await?.into())
    }

    pub async fn approve_batch(&self, id: u64) -> ClientResult<BatchView> {
        let resp = self
            .authorize(self.http.post(self.url(&format!("/batches/{}/approve", id))))
            .send()
            .await?;
        Ok(Self::decode::<Batch>(resp).await?.into())
    }

    pub async fn reject_batch(&self, id: u64, reason: &str) -> ClientResult<BatchView> {
        let resp = self
            .authorize(self.http.post(self.url(&format!("/batches/{}/reject", id))))
            .json(&serde_json::json!({ "reason": reason }))
            .send()
            .await?;
        Ok(Self::decode::<Batch>(resp).await?.into())
    }

    pub async fn process_batch(&self, id: u64, qr_code_hash: &str) -> ClientResult<BatchView> {
        let resp = self
            .authorize(self.http.post(self.url(&format!("/batches/{}/process", id))))
            .json(&serde_json::json!({ "qr_code_hash": qr_code_hash }))
            .send()
            .await?;
        Ok(Self::decode::<Batch>(resp).await?.into())
    }

    pub async fn batch(&self, id: u64) -> ClientResult<BatchView> {
        let resp = self.http.get(self.url(&format!("/batches/{}", id))).send().await?;
        Ok(Self::decode::<Batch>(resp).await?.into())
    }

    pub async fn batch_by_qr(&self, qr_code_hash: &str) -> ClientResult<BatchView> {
        let resp = self
            .http
            .get(self.url(&format!("/trace/{}", qr_code_hash)))
            .send()
            .await?;
        Ok(Self::decode::<Batch>(resp).await?.into())
    }

    pub async fn farmer_batches(&self, farmer: &Address) -> ClientResult<Vec<u64>> {
        let resp = self
            .http
            .get(self.url("/batches"))
            .query(&[("farmer", farmer.as_str())])
            .send()
            .await?;
        Ok(Self::decode::<IdsResponse>(resp).await?.ids)
    }

    pub async fn pending_batches(&self) -> ClientResult<Vec<u64>> {
        self.batches_by_status("pending").await
    }

    pub async fn approved_batches(&self) -> ClientResult<Vec<u64>> {
        self.batches_by_status("approved").await
    }

    async fn batches_by_status(&self, status: &str) -> ClientResult<Vec<u64>> {
        let resp = self
            .http
            .get(self.url("/batches"))
            .query(&[("status", status)])
            .send()
            .await?;
        Ok(Self::decode::<IdsResponse>(resp).await?.ids)
    }

    pub async fn total_batches(&self) -> ClientResult<u64> {
        let resp = self.http.get(self.url("/batches/count")).send().await?;
        Ok(Self::decode::<TotalResponse>(resp).await?.total)
    }

    /// Open the ledger's transition notification stream
    pub async fn subscribe_events(&self) -> ClientResult<EventSubscription> {
        let resp = self.http.get(self.url("/events")).send().await?;
        if !resp.status().is_success() {
            return Err(ClientError::Api {
                code: resp.status().as_u16().to_string(),
                message: "event stream unavailable".to_string(),
            });
        }
        Ok(EventSubscription::new(resp))
    }
}

/// Incremental reader over the ledger's SSE notification stream
pub struct EventSubscription {
    stream: std::pin::Pin<
        Box<dyn futures::Stream<Item = Result<bytes::Bytes, reqwest::Error>> + Send>,
    >,
    buffer: String,
}

impl EventSubscription {
    fn new(resp: reqwest::Response) -> Self {
        Self {
            stream: Box::pin(resp.bytes_stream()),
            buffer: String::new(),
        }
    }

    /// Next transition notification, or `None` once the stream closes
    pub async fn next_event(&mut self) -> Option<BatchEvent> {
        loop {
            // Drain any complete event already buffered
            while let Some(pos) = self.buffer.find('\n') {
                let line = self.buffer[..pos].trim_end_matches('\r').to_string();
                self.buffer.drain(..=pos);

                if let Some(data) = line.strip_prefix("data:") {
                    if let Ok(event) = serde_json::from_str::<BatchEvent>(data.trim()) {
                        return Some(event);
                    }
                    tracing::warn!(payload = data.trim(), "unparseable event payload");
                }
            }

            match self.stream.next().await? {
                Ok(chunk) => {
                    self.buffer.push_str(&String::from_utf8_lossy(&chunk));
                }
                Err(err) => {
                    tracing::warn!(error = %err, "event stream transport error");
                    return None;
                }
            }
        }
    }
}

/// Multiplexer between the remote ledger and the local fallback store.
///
/// A session selects the ledger; without one, operations run against the
/// local store with the configured demo identity as the acting address.
/// The consumer "viewed batch" history is always recorded locally.
pub struct BatchSource {
    client: Option<LedgerClient>,
    store: LocalStore,
    identity: Address,
}

impl BatchSource {
    pub fn new(client: Option<LedgerClient>, store: LocalStore, identity: Address) -> Self {
        Self {
            client,
            store,
            identity,
        }
    }

    pub fn is_remote(&self) -> bool {
        self.client.is_some()
    }

    pub async fn create_batch(&self, input: CreateBatchRequest) -> ClientResult<BatchView> {
        match &self.client {
            Some(client) => client.create_batch(&input).await,
            None => Ok(self.store.create_batch(&self.identity, input)?.into()),
        }
    }

    pub async fn approve_batch(&self, id: u64) -> ClientResult<BatchView> {
        match &self.client {
            Some(client) => client.approve_batch(id).await,
            None => Ok(self.store.approve_batch(id, &self.identity)?.into()),
        }
    }

    pub async fn reject_batch(&self, id: u64, reason: &str) -> ClientResult<BatchView> {
        match &self.client {
            Some(client) => client.reject_batch(id, reason).await,
            None => Ok(self.store.reject_batch(id, &self.identity, reason)?.into()),
        }
    }

    pub async fn process_batch(&self, id: u64, qr_code_hash: &str) -> ClientResult<BatchView> {
        match &self.client {
            Some(client) => client.process_batch(id, qr_code_hash).await,
            None => Ok(self
                .store
                .process_batch(id, &self.identity, qr_code_hash)?
                .into()),
        }
    }

    pub async fn batch(&self, id: u64) -> ClientResult<BatchView> {
        let view: BatchView = match &self.client {
            Some(client) => client.batch(id).await?,
            None => self.store.batch(id)?.into(),
        };
        self.record_view(&view);
        Ok(view)
    }

    pub async fn batch_by_qr(&self, qr_code_hash: &str) -> ClientResult<BatchView> {
        let view: BatchView = match &self.client {
            Some(client) => client.batch_by_qr(qr_code_hash).await?,
            None => self.store.batch_by_qr(qr_code_hash)?.into(),
        };
        self.record_view(&view);
        Ok(view)
    }

    fn record_view(&self, view: &BatchView) {
        // History is advisory; a storage failure never fails the read
        let entry = Batch {
            id: view.id,
            farmer: view.farmer.clone(),
            herb_name: view.herb_name.clone(),
            location: view.location.clone(),
            moisture_percent: view.moisture_percent,
            photo_hash: view.photo_hash.clone(),
            notes: view.notes.clone(),
            status: view.status,
            rejection_reason: view.rejection_reason.clone(),
            qr_code_hash: view.qr_code_hash.clone(),
            lab_officer: view.lab_officer.clone(),
            manufacturer: view.manufacturer.clone(),
            created_at: view.created_at.timestamp(),
            approved_at: view.approved_at.map(|t| t.timestamp()),
            rejected_at: view.rejected_at.map(|t| t.timestamp()),
            processed_at: view.processed_at.map(|t| t.timestamp()),
        };
        if let Err(err) = self.store.record_viewed(&entry) {
            tracing::warn!(error = %err, "failed to record viewed batch");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_batch() -> Batch {
        Batch {
            id: 3,
            farmer: Address::from_bytes(&[1u8; 20]),
            herb_name: "Mint".into(),
            location: "Farm B".into(),
            moisture_percent: 11,
            photo_hash: "ph".into(),
            notes: String::new(),
            status: BatchStatus::Approved,
            rejection_reason: None,
            qr_code_hash: None,
            lab_officer: Some(Address::from_bytes(&[2u8; 20])),
            manufacturer: None,
            created_at: 1_700_000_000,
            approved_at: Some(1_700_000_600),
            rejected_at: None,
            processed_at: None,
        }
    }

    #[test]
    fn view_converts_timestamps_and_status() {
        let view: BatchView = sample_batch().into();
        assert_eq!(view.status_label, "Approved");
        assert_eq!(view.created_at.timestamp(), 1_700_000_000);
        assert_eq!(view.approved_at.unwrap().timestamp(), 1_700_000_600);
        assert!(view.rejected_at.is_none());
    }

    #[test]
    fn epoch_zero_is_representable() {
        assert_eq!(seconds_to_datetime(0).timestamp(), 0);
    }
}
