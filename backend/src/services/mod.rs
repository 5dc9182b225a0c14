//! Business logic services for the HerbChain ledger

pub mod auth;
pub mod events;
pub mod ledger;
pub mod registry;

pub use auth::AuthService;
pub use events::EventBus;
pub use ledger::{LedgerService, LedgerState};
pub use registry::RoleRegistry;
