//! HTTP API layer with Axum routes.
//!
//! This crate provides:
//! - REST API routes
//! - The response envelope shared by every route

pub mod response;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use fundline_core::TransferCoordinator;
use fundline_db::PgLedgerStore;
use sea_orm::DatabaseConnection;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: Arc<DatabaseConnection>,
    /// Transfer coordinator over the Postgres ledger.
    pub coordinator: Arc<TransferCoordinator<PgLedgerStore>>,
}

impl AppState {
    /// Builds the state from a connection pool and the configured retry policy.
    #[must_use]
    pub fn new(db: DatabaseConnection, policy: fundline_core::RetryPolicy) -> Self {
        let coordinator = TransferCoordinator::new(PgLedgerStore::new(db.clone()), policy);
        Self {
            db: Arc::new(db),
            coordinator: Arc::new(coordinator),
        }
    }
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
