//! Storage seam between the coordinator and the ledger backend.

use async_trait::async_trait;
use rust_decimal::Decimal;

use super::error::StoreError;
use super::types::{Account, AccountId, TransferRecord, Version};

/// Opens atomic units of work against the account ledger and transaction log.
///
/// Implementations are shared by every concurrent transfer, so they must be
/// cheap to call from many tasks at once (typically a pooled connection).
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// The unit of work type produced by [`LedgerStore::begin`].
    type Work: UnitOfWork;

    /// Opens a new unit of work.
    async fn begin(&self) -> Result<Self::Work, StoreError>;
}

/// A group of reads and writes that commit or discard together.
///
/// Nothing written through a unit of work is visible to others until
/// [`UnitOfWork::commit`] succeeds. Dropping it without committing discards
/// every staged write.
#[async_trait]
pub trait UnitOfWork: Send {
    /// Reads the current balance and version of an account.
    async fn find_account(&mut self, id: AccountId) -> Result<Option<Account>, StoreError>;

    /// Applies `balance += delta` and advances the version, only if the stored
    /// version still equals `expected`.
    ///
    /// Returns the number of rows affected; zero means the version moved.
    async fn conditional_update_balance(
        &mut self,
        id: AccountId,
        delta: Decimal,
        expected: Version,
    ) -> Result<u64, StoreError>;

    /// Appends one immutable record to the transaction log.
    async fn append_transfer(
        &mut self,
        from: AccountId,
        to: AccountId,
        amount: Decimal,
    ) -> Result<TransferRecord, StoreError>;

    /// Makes every staged write visible atomically.
    async fn commit(self) -> Result<(), StoreError>;

    /// Discards every staged write.
    async fn rollback(self) -> Result<(), StoreError>;
}
