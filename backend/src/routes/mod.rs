//! Route definitions for the HerbChain ledger service

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::{handlers, middleware::auth_middleware, AppState};

/// Create API routes
pub fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        // Health check (public)
        .route("/health", get(handlers::health_check))
        // Auth routes (public)
        .nest("/auth", auth_routes())
        // Public traceability route (unauthenticated - for QR code scanning)
        .route("/trace/:qr_code_hash", get(handlers::trace_batch))
        // Public role lookup
        .route("/roles/:address", get(handlers::get_role))
        // Public batch reads
        .route("/batches", get(handlers::list_batches))
        .route("/batches/count", get(handlers::get_batch_count))
        .route("/batches/:id", get(handlers::get_batch))
        // Transition notification stream (public)
        .route("/events", get(handlers::event_stream))
        // Protected routes - batch mutations
        .merge(batch_mutation_routes(state.clone()))
        // Protected routes - role administration
        .merge(role_admin_routes(state))
}

/// Authentication routes (public)
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(handlers::register))
        .route("/login", post(handlers::login))
        .route("/refresh", post(handlers::refresh))
}

/// Batch mutation routes (protected)
fn batch_mutation_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/batches", post(handlers::create_batch))
        .route("/batches/:id/approve", post(handlers::approve_batch))
        .route("/batches/:id/reject", post(handlers::reject_batch))
        .route("/batches/:id/process", post(handlers::process_batch))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Role administration routes (protected, admin-gated in the registry)
fn role_admin_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/roles/grant", post(handlers::grant_role))
        .route("/roles/revoke", post(handlers::revoke_role))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}
