//! Domain types for transfers.

use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Account identifier, assigned by the caller at creation.
pub type AccountId = i64;

/// Decimal places stored for balances and amounts (`NUMERIC(19, 4)`).
pub const MONEY_SCALE: u32 = 4;

/// Returns true if `amount` is representable at [`MONEY_SCALE`] without rounding.
#[must_use]
pub fn fits_money_scale(amount: Decimal) -> bool {
    amount.normalize().scale() <= MONEY_SCALE
}

/// Opaque optimistic-concurrency stamp of an account row.
///
/// Advances by one on every balance mutation. Only compared for equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Version(i64);

impl Version {
    /// Version assigned to a freshly created account.
    pub const INITIAL: Self = Self(1);

    /// Wraps a stored version value.
    #[must_use]
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    /// Returns the stored value.
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }

    /// Returns the version that follows this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// Point-in-time view of an account row, as read inside a unit of work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    /// Account ID.
    pub id: AccountId,
    /// Current balance, never negative.
    pub balance: Decimal,
    /// Version stamp at read time.
    pub version: Version,
}

/// A request to move `amount` from one account to another.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferRequest {
    /// Source (debited) account.
    pub from: AccountId,
    /// Destination (credited) account.
    pub to: AccountId,
    /// Amount to move.
    pub amount: Decimal,
}

impl TransferRequest {
    /// Creates a new transfer request.
    #[must_use]
    pub const fn new(from: AccountId, to: AccountId, amount: Decimal) -> Self {
        Self { from, to, amount }
    }
}

/// An immutable row of the transaction log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransferRecord {
    /// Log-assigned, monotonically increasing ID.
    pub id: i64,
    /// Source account.
    pub from_account: AccountId,
    /// Destination account.
    pub to_account: AccountId,
    /// Amount moved.
    pub amount: Decimal,
    /// Insertion timestamp.
    pub created_at: DateTime<Utc>,
}

/// Result of a committed transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferReceipt {
    /// Source account.
    pub from: AccountId,
    /// Destination account.
    pub to: AccountId,
    /// Amount moved.
    pub amount: Decimal,
    /// ID of the log row written for this transfer.
    pub transaction_id: i64,
    /// Attempt number (1-based) that committed.
    pub attempts: u32,
    /// Log timestamp of the committed transfer.
    pub created_at: DateTime<Utc>,
}

impl TransferReceipt {
    pub(crate) fn from_record(record: TransferRecord, attempts: u32) -> Self {
        Self {
            from: record.from_account,
            to: record.to_account,
            amount: record.amount,
            transaction_id: record.id,
            attempts,
            created_at: record.created_at,
        }
    }
}

/// Which side of a transfer an account plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccountRole {
    /// The debited account.
    Source,
    /// The credited account.
    Destination,
}

impl fmt::Display for AccountRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Source => f.write_str("source"),
            Self::Destination => f.write_str("destination"),
        }
    }
}

/// The conditional write that lost a version race.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConflictPhase {
    /// The debit of the source account.
    Debit,
    /// The credit of the destination account.
    Credit,
}

impl fmt::Display for ConflictPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Debit => f.write_str("debit"),
            Self::Credit => f.write_str("credit"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fits_money_scale() {
        assert!(fits_money_scale(Decimal::new(1, 4)));
        assert!(fits_money_scale(Decimal::new(150_000_000, 6)));
        assert!(!fits_money_scale(Decimal::new(5, 5)));
    }

    #[test]
    fn test_version_advances_by_one() {
        assert_eq!(Version::INITIAL.get(), 1);
        assert_eq!(Version::INITIAL.next(), Version::new(2));
        assert_eq!(Version::new(41).to_string(), "v41");
    }

    #[test]
    fn test_receipt_copies_record_fields() {
        let record = TransferRecord {
            id: 7,
            from_account: 101,
            to_account: 102,
            amount: Decimal::new(5000, 2),
            created_at: Utc::now(),
        };
        let receipt = TransferReceipt::from_record(record.clone(), 2);

        assert_eq!(receipt.from, 101);
        assert_eq!(receipt.to, 102);
        assert_eq!(receipt.amount, Decimal::new(5000, 2));
        assert_eq!(receipt.transaction_id, 7);
        assert_eq!(receipt.attempts, 2);
        assert_eq!(receipt.created_at, record.created_at);
    }
}
