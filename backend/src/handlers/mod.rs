//! HTTP handlers for the HerbChain ledger

pub mod auth;
pub mod batch;
pub mod events;
pub mod health;
pub mod role;

pub use auth::{login, refresh, register};
pub use batch::{
    approve_batch, create_batch, get_batch, get_batch_count, list_batches, process_batch,
    reject_batch, trace_batch,
};
pub use events::event_stream;
pub use health::health_check;
pub use role::{get_role, grant_role, revoke_role};
