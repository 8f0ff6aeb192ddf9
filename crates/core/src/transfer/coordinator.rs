//! Transfer coordinator.
//!
//! Drives one transfer through read-validate-write-write-log inside a single
//! unit of work per attempt, and retries from scratch when a conditional
//! write loses its version race.
//!
//! Every attempt opens exactly one unit of work. Each exit path commits it
//! or rolls it back exactly once before returning or looping.
//!
//! Two transfers between the same pair in opposite directions cannot
//! deadlock here, since neither holds a lock across its reads, but one of
//! them may have to retry.

use tracing::{debug, info, warn};

use super::error::TransferError;
use super::policy::RetryPolicy;
use super::store::{LedgerStore, UnitOfWork};
use super::types::{AccountRole, ConflictPhase, TransferReceipt, TransferRecord, TransferRequest};
use super::validation::validate_transfer;

/// How a single attempt ended when it did not produce a log record.
#[derive(Debug)]
enum AttemptFailure {
    /// A conditional write found the version moved.
    Conflict(ConflictPhase),
    /// Anything else; never retried.
    Terminal(TransferError),
}

impl From<TransferError> for AttemptFailure {
    fn from(err: TransferError) -> Self {
        Self::Terminal(err)
    }
}

/// Orchestrates transfers against a [`LedgerStore`].
///
/// Holds no persistent state of its own and is safe to share between any
/// number of concurrent callers.
#[derive(Debug)]
pub struct TransferCoordinator<S> {
    store: S,
    policy: RetryPolicy,
}

impl<S: LedgerStore> TransferCoordinator<S> {
    /// Creates a coordinator over `store`.
    #[must_use]
    pub const fn new(store: S, policy: RetryPolicy) -> Self {
        Self { store, policy }
    }

    /// Returns the underlying store.
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Moves `request.amount` from `request.from` to `request.to`.
    ///
    /// # Errors
    ///
    /// - `InvalidAmount` / `SameAccount` before any unit of work is opened
    /// - `AccountNotFound`, `InsufficientFunds`, `LoggingFailed`,
    ///   `CommitFailed`, `Database` immediately, without retry
    /// - `ConcurrencyConflict` once the final attempt loses a version race
    pub async fn transfer(&self, request: TransferRequest) -> Result<TransferReceipt, TransferError> {
        validate_transfer(&request)?;

        let mut attempt = 1;
        loop {
            debug!(
                from = request.from,
                to = request.to,
                amount = %request.amount,
                attempt,
                "Starting transfer attempt"
            );

            let mut work = self.store.begin().await.map_err(TransferError::Database)?;

            match Self::run_attempt(&mut work, &request).await {
                Ok(record) => {
                    work.commit().await.map_err(TransferError::CommitFailed)?;
                    info!(
                        transaction_id = record.id,
                        from = record.from_account,
                        to = record.to_account,
                        amount = %record.amount,
                        attempt,
                        "Transfer committed"
                    );
                    return Ok(TransferReceipt::from_record(record, attempt));
                }
                Err(failure) => {
                    Self::discard(work).await;

                    match failure {
                        AttemptFailure::Conflict(phase) if !self.policy.is_final(attempt) => {
                            warn!(
                                from = request.from,
                                to = request.to,
                                %phase,
                                attempt,
                                "Version conflict, retrying transfer"
                            );
                            tokio::time::sleep(self.policy.backoff()).await;
                            attempt += 1;
                        }
                        AttemptFailure::Conflict(phase) => {
                            warn!(
                                from = request.from,
                                to = request.to,
                                %phase,
                                attempt,
                                "Version conflict on final attempt"
                            );
                            return Err(TransferError::ConcurrencyConflict {
                                phase,
                                attempts: attempt,
                            });
                        }
                        AttemptFailure::Terminal(err) => return Err(err),
                    }
                }
            }
        }
    }

    /// Runs steps 2-7 of one attempt. The caller owns commit and rollback.
    async fn run_attempt(
        work: &mut S::Work,
        request: &TransferRequest,
    ) -> Result<TransferRecord, AttemptFailure> {
        let from = work
            .find_account(request.from)
            .await
            .map_err(TransferError::Database)?
            .ok_or(TransferError::AccountNotFound {
                account_id: request.from,
                role: AccountRole::Source,
            })?;

        if from.balance < request.amount {
            return Err(TransferError::InsufficientFunds {
                account_id: from.id,
                available: from.balance,
                requested: request.amount,
            }
            .into());
        }

        let debited = work
            .conditional_update_balance(request.from, -request.amount, from.version)
            .await
            .map_err(TransferError::Database)?;
        if debited == 0 {
            return Err(AttemptFailure::Conflict(ConflictPhase::Debit));
        }

        let to = work
            .find_account(request.to)
            .await
            .map_err(TransferError::Database)?
            .ok_or(TransferError::AccountNotFound {
                account_id: request.to,
                role: AccountRole::Destination,
            })?;

        let credited = work
            .conditional_update_balance(request.to, request.amount, to.version)
            .await
            .map_err(TransferError::Database)?;
        if credited == 0 {
            return Err(AttemptFailure::Conflict(ConflictPhase::Credit));
        }

        let record = work
            .append_transfer(request.from, request.to, request.amount)
            .await
            .map_err(TransferError::LoggingFailed)?;

        Ok(record)
    }

    async fn discard(work: S::Work) {
        if let Err(e) = work.rollback().await {
            warn!(error = %e, "Failed to roll back transfer attempt");
        }
    }
}
