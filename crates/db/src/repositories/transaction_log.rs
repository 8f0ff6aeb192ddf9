//! Read access to the append-only transaction log.
//!
//! Rows are only ever written by [`crate::store::PgUnitOfWork::append_transfer`].

use fundline_core::{AccountId, TransferRecord};
use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect,
};

use crate::entities::transactions;

impl From<transactions::Model> for TransferRecord {
    fn from(model: transactions::Model) -> Self {
        Self {
            id: model.id,
            from_account: model.from_account,
            to_account: model.to_account,
            amount: model.amount,
            created_at: model.created_at.into(),
        }
    }
}

/// Transaction log repository.
#[derive(Debug, Clone)]
pub struct TransactionLogRepository {
    db: DatabaseConnection,
}

impl TransactionLogRepository {
    /// Default page size for listings.
    pub const DEFAULT_LIMIT: u64 = 50;
    /// Largest page size accepted for listings.
    pub const MAX_LIMIT: u64 = 100;

    /// Creates a new transaction log repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Finds a log row by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(&self, id: i64) -> Result<Option<TransferRecord>, DbErr> {
        Ok(transactions::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .map(TransferRecord::from))
    }

    /// Lists transfers where the account was source or destination, newest first.
    ///
    /// `limit` is clamped to `1..=MAX_LIMIT`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_for_account(
        &self,
        account_id: AccountId,
        limit: u64,
    ) -> Result<Vec<TransferRecord>, DbErr> {
        let rows = transactions::Entity::find()
            .filter(
                Condition::any()
                    .add(transactions::Column::FromAccount.eq(account_id))
                    .add(transactions::Column::ToAccount.eq(account_id)),
            )
            .order_by_desc(transactions::Column::Id)
            .limit(limit.clamp(1, Self::MAX_LIMIT))
            .all(&self.db)
            .await?;

        Ok(rows.into_iter().map(TransferRecord::from).collect())
    }
}
