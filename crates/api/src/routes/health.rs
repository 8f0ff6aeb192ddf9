//! Liveness and ledger reachability.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Serialize;
use tracing::warn;

use crate::AppState;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// `"healthy"` when the ledger answers, `"degraded"` otherwise.
    pub status: &'static str,
    /// Whether the ledger database answered a ping.
    pub ledger: &'static str,
    /// Service version.
    pub version: &'static str,
}

/// GET `/health` - 200 when the ledger database answers, 503 otherwise.
async fn health_check(State(state): State<AppState>) -> Response {
    let (code, status, ledger) = match state.db.ping().await {
        Ok(()) => (StatusCode::OK, "healthy", "reachable"),
        Err(e) => {
            warn!(error = %e, "Ledger database ping failed");
            (StatusCode::SERVICE_UNAVAILABLE, "degraded", "unreachable")
        }
    };

    (
        code,
        Json(HealthResponse {
            status,
            ledger,
            version: env!("CARGO_PKG_VERSION"),
        }),
    )
        .into_response()
}

/// Creates health check routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
