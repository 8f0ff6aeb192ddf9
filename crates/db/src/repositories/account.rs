//! Account repository for ledger account database operations.
//!
//! Covers the thin operations outside a transfer: creating an account and
//! reading its balance. Balance mutation only happens through
//! [`crate::store::PgUnitOfWork`].

use chrono::Utc;
use fundline_core::{AccountId, Version, fits_money_scale};
use fundline_shared::AppError;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, DatabaseConnection, DbErr, EntityTrait, Set, SqlErr};

use crate::entities::accounts;

/// Error types for account operations.
#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    /// Account ID is already taken.
    #[error("Account already exists: {0}")]
    AlreadyExists(AccountId),

    /// Initial balance was negative.
    #[error("Initial balance cannot be negative, got {0}")]
    NegativeBalance(Decimal),

    /// Initial balance has more decimal places than the ledger stores.
    #[error("Initial balance allows at most 4 decimal places, got {0}")]
    TooPrecise(Decimal),

    /// Account not found.
    #[error("Account not found: {0}")]
    NotFound(AccountId),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl AccountError {
    /// Returns the numeric code reported in the response envelope.
    #[must_use]
    pub const fn code(&self) -> u32 {
        match self {
            Self::NegativeBalance(_) | Self::TooPrecise(_) => 1002,
            Self::AlreadyExists(_) => 1003,
            Self::Database(_) => 1004,
            Self::NotFound(_) => 1010,
        }
    }
}

impl From<AccountError> for AppError {
    fn from(err: AccountError) -> Self {
        let code = err.code();
        match err {
            AccountError::NegativeBalance(_) => Self::Validation {
                code,
                message: "Initial balance cannot be negative".to_string(),
            },
            AccountError::TooPrecise(_) => Self::Validation {
                code,
                message: "Initial balance allows at most 4 decimal places".to_string(),
            },
            AccountError::AlreadyExists(_) => Self::Conflict {
                code,
                message: "Account already exists".to_string(),
            },
            AccountError::NotFound(_) => Self::NotFound {
                code,
                message: "Account not found".to_string(),
            },
            AccountError::Database(_) => Self::Database {
                code,
                message: "Failed to create account".to_string(),
            },
        }
    }
}

/// Account repository for create and read operations.
#[derive(Debug, Clone)]
pub struct AccountRepository {
    db: DatabaseConnection,
}

impl AccountRepository {
    /// Creates a new account repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates an account with the given ID and opening balance.
    ///
    /// Uniqueness is enforced by the primary key, so two concurrent creates
    /// of the same ID cannot both succeed.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The initial balance is negative or finer than `MONEY_SCALE`
    /// - The ID already exists
    /// - Database operation fails
    pub async fn create_account(
        &self,
        id: AccountId,
        initial_balance: Decimal,
    ) -> Result<accounts::Model, AccountError> {
        if initial_balance < Decimal::ZERO {
            return Err(AccountError::NegativeBalance(initial_balance));
        }
        if !fits_money_scale(initial_balance) {
            return Err(AccountError::TooPrecise(initial_balance));
        }

        let now = Utc::now().into();
        let account = accounts::ActiveModel {
            id: Set(id),
            balance: Set(initial_balance),
            version: Set(Version::INITIAL.get()),
            created_at: Set(now),
            updated_at: Set(now),
        };

        account.insert(&self.db).await.map_err(|e| match e.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => AccountError::AlreadyExists(id),
            _ => AccountError::Database(e),
        })
    }

    /// Finds an account by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_account(&self, id: AccountId) -> Result<Option<accounts::Model>, AccountError> {
        Ok(accounts::Entity::find_by_id(id).one(&self.db).await?)
    }

    /// Gets an account by ID.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no such account exists, or a database error.
    pub async fn get_account(&self, id: AccountId) -> Result<accounts::Model, AccountError> {
        self.find_account(id)
            .await?
            .ok_or(AccountError::NotFound(id))
    }
}
