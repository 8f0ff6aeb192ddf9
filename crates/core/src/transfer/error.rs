//! Transfer error types.
//!
//! Every variant maps to a stable numeric API code and a fixed message.
//! Store failure detail is kept in the error for logging but never ends up
//! in [`TransferError::message`].

use fundline_shared::AppError;
use rust_decimal::Decimal;
use thiserror::Error;

use super::types::{AccountId, AccountRole, ConflictPhase};

/// Failure reported by a storage backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Storage error: {0}")]
pub struct StoreError(String);

impl StoreError {
    /// Wraps any backend error.
    pub fn backend(err: impl std::fmt::Display) -> Self {
        Self(err.to_string())
    }

    /// Returns the backend detail.
    #[must_use]
    pub fn detail(&self) -> &str {
        &self.0
    }
}

/// Errors that can occur while executing a transfer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransferError {
    // ========== Validation Errors ==========
    /// Amount was zero, negative, or finer than the stored scale.
    #[error("Amount must be positive with at most 4 decimal places, got {0}")]
    InvalidAmount(Decimal),

    /// Source and destination are the same account.
    #[error("Source and destination account cannot be the same: {0}")]
    SameAccount(AccountId),

    // ========== Account Errors ==========
    /// Referenced account does not exist.
    #[error("{role} account not found: {account_id}")]
    AccountNotFound {
        /// The missing account.
        account_id: AccountId,
        /// Whether it was the source or destination.
        role: AccountRole,
    },

    /// Source balance is below the requested amount.
    #[error("Insufficient funds in account {account_id}: available {available}, requested {requested}")]
    InsufficientFunds {
        /// The source account.
        account_id: AccountId,
        /// Balance at read time.
        available: Decimal,
        /// Amount requested.
        requested: Decimal,
    },

    // ========== Concurrency Errors ==========
    /// Every attempt lost its version race.
    #[error("Concurrency conflict on {phase} after {attempts} attempts")]
    ConcurrencyConflict {
        /// The conditional write that failed on the final attempt.
        phase: ConflictPhase,
        /// Attempts made.
        attempts: u32,
    },

    // ========== Unit Of Work Errors ==========
    /// Appending to the transaction log failed; the unit of work was discarded.
    #[error("Failed to log transaction: {0}")]
    LoggingFailed(StoreError),

    /// Committing the unit of work failed.
    #[error("Failed to commit transaction: {0}")]
    CommitFailed(StoreError),

    /// Opening the unit of work or an unexpected read/write failed.
    #[error("Database error: {0}")]
    Database(StoreError),
}

impl TransferError {
    /// Returns the string error kind recorded in logs.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidAmount(_) | Self::SameAccount(_) => "INVALID_INPUT",
            Self::AccountNotFound { .. } => "ACCOUNT_NOT_FOUND",
            Self::InsufficientFunds { .. } => "INSUFFICIENT_FUNDS",
            Self::ConcurrencyConflict { .. } => "CONCURRENCY_CONFLICT",
            Self::LoggingFailed(_) => "LOGGING_FAILED",
            Self::CommitFailed(_) => "COMMIT_FAILED",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }

    /// Returns the numeric code reported in the response envelope.
    #[must_use]
    pub const fn code(&self) -> u32 {
        match self {
            Self::InvalidAmount(_) | Self::SameAccount(_) => 1012,
            Self::Database(_) => 1013,
            Self::AccountNotFound {
                role: AccountRole::Source,
                ..
            } => 1014,
            Self::InsufficientFunds { .. } => 1015,
            Self::ConcurrencyConflict {
                phase: ConflictPhase::Debit,
                ..
            } => 1016,
            Self::AccountNotFound {
                role: AccountRole::Destination,
                ..
            } => 1017,
            Self::ConcurrencyConflict {
                phase: ConflictPhase::Credit,
                ..
            } => 1018,
            Self::LoggingFailed(_) => 1019,
            Self::CommitFailed(_) => 1020,
        }
    }

    /// Returns the caller-facing message, free of storage detail.
    #[must_use]
    pub const fn message(&self) -> &'static str {
        match self {
            Self::InvalidAmount(_) => "Amount must be positive with at most 4 decimal places",
            Self::SameAccount(_) => "Source and destination account must differ",
            Self::Database(_) => "Database error",
            Self::AccountNotFound {
                role: AccountRole::Source,
                ..
            } => "Source account not found",
            Self::AccountNotFound {
                role: AccountRole::Destination,
                ..
            } => "Destination account not found",
            Self::InsufficientFunds { .. } => "Insufficient funds",
            Self::ConcurrencyConflict {
                phase: ConflictPhase::Debit,
                ..
            } => "Concurrency conflict on debit after retries",
            Self::ConcurrencyConflict {
                phase: ConflictPhase::Credit,
                ..
            } => "Concurrency conflict on credit after retries",
            Self::LoggingFailed(_) => "Failed to log transaction",
            Self::CommitFailed(_) => "Failed to commit transaction",
        }
    }

}

impl From<TransferError> for AppError {
    fn from(err: TransferError) -> Self {
        let code = err.code();
        let message = err.message().to_string();
        match err {
            TransferError::InvalidAmount(_) | TransferError::SameAccount(_) => {
                Self::Validation { code, message }
            }
            TransferError::AccountNotFound { .. } => Self::NotFound { code, message },
            TransferError::InsufficientFunds { .. } => Self::BusinessRule { code, message },
            TransferError::ConcurrencyConflict { .. } => Self::Conflict { code, message },
            TransferError::LoggingFailed(_)
            | TransferError::CommitFailed(_)
            | TransferError::Database(_) => Self::Database { code, message },
        }
    }
}
