//! Transfer routes.

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::Response,
    routing::post,
};
use chrono::{DateTime, Utc};
use fundline_core::{AccountId, TransferError, TransferReceipt, TransferRequest};
use fundline_shared::AppError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::AppState;
use crate::response::{self, method_not_allowed, success};

/// Creates the transfer routes.
pub fn routes() -> Router<AppState> {
    Router::new().route(
        "/transactions",
        post(create_transfer).fallback(|| async { method_not_allowed(1011, "POST") }),
    )
}

/// Request body for a transfer.
#[derive(Debug, Deserialize)]
pub struct CreateTransferRequest {
    /// Account to debit.
    pub source_account_id: AccountId,
    /// Account to credit.
    pub destination_account_id: AccountId,
    /// Amount to move, must be positive.
    pub amount: Decimal,
}

/// Response for a committed transfer.
#[derive(Debug, Serialize)]
pub struct TransferResponse {
    /// Debited account.
    pub source_account_id: AccountId,
    /// Credited account.
    pub destination_account_id: AccountId,
    /// Amount moved.
    pub amount: Decimal,
    /// Transaction log row ID.
    pub transaction_id: i64,
    /// Attempt that committed.
    pub attempts: u32,
    /// Log timestamp.
    pub created_at: DateTime<Utc>,
}

impl From<TransferReceipt> for TransferResponse {
    fn from(receipt: TransferReceipt) -> Self {
        Self {
            source_account_id: receipt.from,
            destination_account_id: receipt.to,
            amount: receipt.amount,
            transaction_id: receipt.transaction_id,
            attempts: receipt.attempts,
            created_at: receipt.created_at,
        }
    }
}

/// POST `/transactions` - Move funds between two accounts.
async fn create_transfer(
    State(state): State<AppState>,
    payload: Result<Json<CreateTransferRequest>, JsonRejection>,
) -> Response {
    let Ok(Json(payload)) = payload else {
        return response::error(&AppError::Validation {
            code: 1012,
            message: "Invalid request payload".to_string(),
        });
    };

    let request = TransferRequest::new(
        payload.source_account_id,
        payload.destination_account_id,
        payload.amount,
    );

    match state.coordinator.transfer(request).await {
        Ok(receipt) => success(
            StatusCode::OK,
            2003,
            "Transfer successful",
            TransferResponse::from(receipt),
        ),
        Err(e) => {
            match &e {
                TransferError::LoggingFailed(store)
                | TransferError::CommitFailed(store)
                | TransferError::Database(store) => {
                    error!(
                        error = store.detail(),
                        kind = e.error_code(),
                        code = e.code(),
                        from = request.from,
                        to = request.to,
                        "Transfer failed"
                    );
                }
                _ => info!(
                    kind = e.error_code(),
                    code = e.code(),
                    from = request.from,
                    to = request.to,
                    "Transfer rejected"
                ),
            }
            response::error(&e.into())
        }
    }
}
