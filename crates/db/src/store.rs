//! Postgres implementation of the transfer ledger store.
//!
//! Each [`PgUnitOfWork`] wraps one database transaction. Balance writes are
//! version-gated `UPDATE`s: the row is only touched if its version still
//! matches the one read earlier, and the affected row count tells the
//! coordinator whether it lost a race.
//!
//! Two transfers crossing the same pair in opposite directions can wait on
//! each other's row locks. Postgres aborts one of them as a deadlock victim;
//! that update is reported as zero rows affected so the coordinator retries
//! it like any other conflict.

use async_trait::async_trait;
use chrono::Utc;
use fundline_core::{
    Account, AccountId, LedgerStore, StoreError, TransferRecord, UnitOfWork, Version,
};
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait,
    QueryFilter, RuntimeErr, Set, TransactionTrait,
};

use crate::entities::{accounts, transactions};

/// SQLSTATE codes for a transaction aborted by lock contention.
const DEADLOCK_DETECTED: &str = "40P01";
const SERIALIZATION_FAILURE: &str = "40001";

fn is_lock_conflict(err: &DbErr) -> bool {
    match err {
        DbErr::Exec(RuntimeErr::SqlxError(sea_orm::sqlx::Error::Database(db)))
        | DbErr::Query(RuntimeErr::SqlxError(sea_orm::sqlx::Error::Database(db))) => db
            .code()
            .is_some_and(|code| code == DEADLOCK_DETECTED || code == SERIALIZATION_FAILURE),
        _ => false,
    }
}

/// Ledger store backed by a pooled Postgres connection.
#[derive(Debug, Clone)]
pub struct PgLedgerStore {
    db: DatabaseConnection,
}

impl PgLedgerStore {
    /// Creates a new store over the given connection pool.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl LedgerStore for PgLedgerStore {
    type Work = PgUnitOfWork;

    async fn begin(&self) -> Result<Self::Work, StoreError> {
        let txn = self.db.begin().await.map_err(StoreError::backend)?;
        Ok(PgUnitOfWork { txn })
    }
}

/// One database transaction. Dropping it without committing rolls back.
pub struct PgUnitOfWork {
    txn: DatabaseTransaction,
}

impl std::fmt::Debug for PgUnitOfWork {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgUnitOfWork").finish_non_exhaustive()
    }
}

#[async_trait]
impl UnitOfWork for PgUnitOfWork {
    async fn find_account(&mut self, id: AccountId) -> Result<Option<Account>, StoreError> {
        let model = accounts::Entity::find_by_id(id)
            .one(&self.txn)
            .await
            .map_err(StoreError::backend)?;

        Ok(model.map(|m| Account {
            id: m.id,
            balance: m.balance,
            version: Version::new(m.version),
        }))
    }

    async fn conditional_update_balance(
        &mut self,
        id: AccountId,
        delta: Decimal,
        expected: Version,
    ) -> Result<u64, StoreError> {
        let result = accounts::Entity::update_many()
            .col_expr(
                accounts::Column::Balance,
                Expr::col(accounts::Column::Balance).add(delta),
            )
            .col_expr(
                accounts::Column::Version,
                Expr::col(accounts::Column::Version).add(1),
            )
            .col_expr(accounts::Column::UpdatedAt, Expr::current_timestamp().into())
            .filter(accounts::Column::Id.eq(id))
            .filter(accounts::Column::Version.eq(expected.get()))
            .exec(&self.txn)
            .await;

        match result {
            Ok(result) => Ok(result.rows_affected),
            Err(err) if is_lock_conflict(&err) => {
                tracing::debug!(account_id = id, error = %err, "Balance update lost a lock race");
                Ok(0)
            }
            Err(err) => Err(StoreError::backend(err)),
        }
    }

    async fn append_transfer(
        &mut self,
        from: AccountId,
        to: AccountId,
        amount: Decimal,
    ) -> Result<TransferRecord, StoreError> {
        let row = transactions::ActiveModel {
            from_account: Set(from),
            to_account: Set(to),
            amount: Set(amount),
            created_at: Set(Utc::now().into()),
            ..Default::default()
        };

        let model = row.insert(&self.txn).await.map_err(StoreError::backend)?;
        Ok(model.into())
    }

    async fn commit(self) -> Result<(), StoreError> {
        self.txn.commit().await.map_err(StoreError::backend)
    }

    async fn rollback(self) -> Result<(), StoreError> {
        self.txn.rollback().await.map_err(StoreError::backend)
    }
}
