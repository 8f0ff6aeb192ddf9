//! Account routes.

use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
    response::Response,
    routing::{get, post},
};
use fundline_core::{AccountId, TransferRecord};
use fundline_db::{AccountError, AccountRepository, TransactionLogRepository};
use fundline_shared::AppError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::AppState;
use crate::response::{self, method_not_allowed, success};

/// Creates the account routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/accounts",
            post(create_account).fallback(|| async { method_not_allowed(1001, "POST") }),
        )
        .route(
            "/accounts/{account_id}",
            get(get_account).fallback(|| async { method_not_allowed(1006, "GET") }),
        )
        .route(
            "/accounts/{account_id}/transactions",
            get(list_account_transactions).fallback(|| async { method_not_allowed(1006, "GET") }),
        )
}

/// Request body for creating an account.
#[derive(Debug, Deserialize)]
pub struct CreateAccountRequest {
    /// Caller-assigned account ID.
    pub account_id: AccountId,
    /// Opening balance, must not be negative.
    pub initial_balance: Decimal,
}

/// Response for a created account.
#[derive(Debug, Serialize)]
pub struct CreatedAccountResponse {
    /// Account ID.
    pub account_id: AccountId,
    /// Opening balance.
    pub initial_balance: Decimal,
}

/// Response for an account lookup.
#[derive(Debug, Serialize)]
pub struct AccountResponse {
    /// Account ID.
    pub account_id: AccountId,
    /// Current balance.
    pub balance: Decimal,
}

/// Query parameters for listing an account's transfers.
#[derive(Debug, Deserialize)]
pub struct ListTransactionsQuery {
    /// Maximum number of rows, newest first.
    pub limit: Option<u64>,
}

fn invalid_account_id() -> Response {
    response::error(&AppError::Validation {
        code: 1008,
        message: "Invalid account ID".to_string(),
    })
}

fn read_failed(err: &sea_orm::DbErr) -> Response {
    error!(error = %err, "Failed to read account");
    response::error(&AppError::Database {
        code: 1009,
        message: "Database error".to_string(),
    })
}

/// POST `/accounts` - Create an account with an opening balance.
async fn create_account(
    State(state): State<AppState>,
    payload: Result<Json<CreateAccountRequest>, JsonRejection>,
) -> Response {
    let Ok(Json(payload)) = payload else {
        return response::error(&AppError::Validation {
            code: 1002,
            message: "Invalid request payload".to_string(),
        });
    };

    let repo = AccountRepository::new((*state.db).clone());
    match repo
        .create_account(payload.account_id, payload.initial_balance)
        .await
    {
        Ok(account) => {
            info!(account_id = account.id, balance = %account.balance, "Account created");
            success(
                StatusCode::CREATED,
                2001,
                "Account created",
                CreatedAccountResponse {
                    account_id: account.id,
                    initial_balance: account.balance,
                },
            )
        }
        Err(e) => {
            if let AccountError::Database(db_err) = &e {
                error!(error = %db_err, account_id = payload.account_id, "Failed to create account");
            }
            response::error(&e.into())
        }
    }
}

/// GET `/accounts/{account_id}` - Get an account's balance.
async fn get_account(
    State(state): State<AppState>,
    account_id: Result<Path<AccountId>, PathRejection>,
) -> Response {
    let Ok(Path(account_id)) = account_id else {
        return invalid_account_id();
    };

    let repo = AccountRepository::new((*state.db).clone());
    match repo.get_account(account_id).await {
        Ok(account) => success(
            StatusCode::OK,
            2002,
            "Account retrieved",
            AccountResponse {
                account_id: account.id,
                balance: account.balance,
            },
        ),
        Err(AccountError::Database(e)) => read_failed(&e),
        Err(e) => response::error(&e.into()),
    }
}

/// GET `/accounts/{account_id}/transactions` - List transfers touching an account.
async fn list_account_transactions(
    State(state): State<AppState>,
    account_id: Result<Path<AccountId>, PathRejection>,
    query: Result<Query<ListTransactionsQuery>, QueryRejection>,
) -> Response {
    let Ok(Path(account_id)) = account_id else {
        return invalid_account_id();
    };
    let Ok(Query(query)) = query else {
        return response::error(&AppError::Validation {
            code: 1008,
            message: "Invalid query parameters".to_string(),
        });
    };

    let accounts = AccountRepository::new((*state.db).clone());
    match accounts.get_account(account_id).await {
        Ok(_) => {}
        Err(AccountError::Database(e)) => return read_failed(&e),
        Err(e) => return response::error(&e.into()),
    }

    let log = TransactionLogRepository::new((*state.db).clone());
    let limit = query.limit.unwrap_or(TransactionLogRepository::DEFAULT_LIMIT);
    match log.list_for_account(account_id, limit).await {
        Ok(records) => success::<Vec<TransferRecord>>(
            StatusCode::OK,
            2004,
            "Transactions retrieved",
            records,
        ),
        Err(e) => read_failed(&e),
    }
}
