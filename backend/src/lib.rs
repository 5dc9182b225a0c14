//! HerbChain - Batch Ledger Service
//!
//! A traceability ledger for herb batches moving through a role-gated
//! four-stage workflow: Pending -> Approved/Rejected -> Processed.

use axum::{routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod services;

pub use config::Config;

use crate::error::AppResult;
use crate::services::{AuthService, EventBus, LedgerService, RoleRegistry};
use shared::models::Role;
use shared::types::Address;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: std::sync::Arc<Config>,
    pub ledger: LedgerService,
    pub registry: RoleRegistry,
    pub auth: AuthService,
    pub events: EventBus,
}

impl AppState {
    /// Wire up services from configuration: seed the default-admin identity
    /// and any configured role-seed addresses into the registry.
    pub async fn from_config(config: Config) -> AppResult<Self> {
        let admin = Address::parse(&config.ledger.admin_address).map_err(|e| {
            error::AppError::Configuration(format!("ledger.admin_address: {}", e))
        })?;

        let registry = RoleRegistry::new(admin);
        seed_roles(&registry, &config.ledger.farmer_addresses, Role::Farmer).await?;
        seed_roles(
            &registry,
            &config.ledger.lab_officer_addresses,
            Role::LabOfficer,
        )
        .await?;
        seed_roles(
            &registry,
            &config.ledger.manufacturer_addresses,
            Role::Manufacturer,
        )
        .await?;

        let events = EventBus::new();
        let ledger = LedgerService::new(registry.clone(), events.clone());
        let auth = AuthService::new(&config);

        Ok(Self {
            config: std::sync::Arc::new(config),
            ledger,
            registry,
            auth,
            events,
        })
    }
}

async fn seed_roles(registry: &RoleRegistry, addresses: &[String], role: Role) -> AppResult<()> {
    for raw in addresses {
        let address = Address::parse(raw).map_err(|e| {
            error::AppError::Configuration(format!("role seed address {:?}: {}", raw, e))
        })?;
        registry.seed(address, role).await;
    }
    Ok(())
}

/// Create the application router with all routes and middleware
pub fn create_app(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .nest("/api/v1", routes::api_routes(state.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Root endpoint
async fn root() -> &'static str {
    "HerbChain Batch Ledger API v1.0"
}
