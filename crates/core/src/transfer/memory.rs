//! In-memory `LedgerStore` used by the coordinator tests.
//!
//! Mirrors the row-level behaviour of the Postgres store closely enough for
//! the retry protocol to be exercised: staged writes stay private until
//! commit, and a row written by one open unit of work makes every other
//! conditional write to that row affect zero rows. Faults can be injected
//! for begin, append and commit, and `contend` simulates a concurrent writer
//! committing right after an account is read.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;

use super::error::StoreError;
use super::store::{LedgerStore, UnitOfWork};
use super::types::{Account, AccountId, TransferRecord, Version};

#[derive(Debug, Clone, Copy)]
struct Row {
    balance: Decimal,
    version: Version,
}

#[derive(Debug, Default)]
struct State {
    accounts: BTreeMap<AccountId, Row>,
    log: Vec<TransferRecord>,
    next_log_id: i64,
    /// Rows with a staged write, keyed by the unit of work holding them.
    claims: HashMap<AccountId, u64>,
    /// Remaining forced version bumps per account.
    contention: HashMap<AccountId, u32>,
}

#[derive(Debug, Default)]
struct Faults {
    fail_begin: AtomicBool,
    fail_append: AtomicBool,
    fail_commit: AtomicBool,
    interleave: AtomicBool,
}

#[derive(Debug, Default)]
struct Counters {
    next_work_id: AtomicU64,
    begins: AtomicU32,
    commits: AtomicU32,
    rollbacks: AtomicU32,
}

#[derive(Debug, Default)]
struct Shared {
    state: Mutex<State>,
    faults: Faults,
    counters: Counters,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

/// Shared in-memory ledger.
#[derive(Debug, Clone, Default)]
pub(crate) struct InMemoryLedger {
    shared: Arc<Shared>,
}

impl InMemoryLedger {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_account(self, id: AccountId, balance: Decimal) -> Self {
        self.shared.lock().accounts.insert(
            id,
            Row {
                balance,
                version: Version::INITIAL,
            },
        );
        self
    }

    /// Yields to the scheduler inside every operation so concurrent units of
    /// work interleave.
    pub(crate) fn interleaved(self) -> Self {
        self.shared.faults.interleave.store(true, Ordering::SeqCst);
        self
    }

    pub(crate) fn fail_begin(&self, fail: bool) {
        self.shared.faults.fail_begin.store(fail, Ordering::SeqCst);
    }

    pub(crate) fn fail_append(&self, fail: bool) {
        self.shared.faults.fail_append.store(fail, Ordering::SeqCst);
    }

    pub(crate) fn fail_commit(&self, fail: bool) {
        self.shared.faults.fail_commit.store(fail, Ordering::SeqCst);
    }

    /// Bumps the committed version of `id` right after each of the next
    /// `times` reads of it.
    pub(crate) fn contend(&self, id: AccountId, times: u32) {
        self.shared.lock().contention.insert(id, times);
    }

    pub(crate) fn balance(&self, id: AccountId) -> Option<Decimal> {
        self.shared.lock().accounts.get(&id).map(|row| row.balance)
    }

    pub(crate) fn version(&self, id: AccountId) -> Option<i64> {
        self.shared.lock().accounts.get(&id).map(|row| row.version.get())
    }

    pub(crate) fn log(&self) -> Vec<TransferRecord> {
        self.shared.lock().log.clone()
    }

    pub(crate) fn total_balance(&self) -> Decimal {
        self.shared.lock().accounts.values().map(|row| row.balance).sum()
    }

    pub(crate) fn begins(&self) -> u32 {
        self.shared.counters.begins.load(Ordering::SeqCst)
    }

    pub(crate) fn commits(&self) -> u32 {
        self.shared.counters.commits.load(Ordering::SeqCst)
    }

    pub(crate) fn rollbacks(&self) -> u32 {
        self.shared.counters.rollbacks.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LedgerStore for InMemoryLedger {
    type Work = InMemoryWork;

    async fn begin(&self) -> Result<Self::Work, StoreError> {
        if self.shared.faults.fail_begin.load(Ordering::SeqCst) {
            return Err(StoreError::backend("connection pool exhausted"));
        }
        self.shared.counters.begins.fetch_add(1, Ordering::SeqCst);
        let id = self.shared.counters.next_work_id.fetch_add(1, Ordering::SeqCst);
        Ok(InMemoryWork {
            id,
            shared: Arc::clone(&self.shared),
            staged: BTreeMap::new(),
            claimed: HashSet::new(),
            staged_log: Vec::new(),
        })
    }
}

/// Unit of work over [`InMemoryLedger`]. Releases its row claims on drop.
#[derive(Debug)]
pub(crate) struct InMemoryWork {
    id: u64,
    shared: Arc<Shared>,
    staged: BTreeMap<AccountId, Row>,
    claimed: HashSet<AccountId>,
    staged_log: Vec<TransferRecord>,
}

impl InMemoryWork {
    async fn pause(&self) {
        if self.shared.faults.interleave.load(Ordering::SeqCst) {
            tokio::task::yield_now().await;
        }
    }

    fn release_claims(&mut self) {
        let mut state = self.shared.lock();
        for id in self.claimed.drain() {
            if state.claims.get(&id) == Some(&self.id) {
                state.claims.remove(&id);
            }
        }
    }
}

impl Drop for InMemoryWork {
    fn drop(&mut self) {
        self.release_claims();
    }
}

#[async_trait]
impl UnitOfWork for InMemoryWork {
    async fn find_account(&mut self, id: AccountId) -> Result<Option<Account>, StoreError> {
        let found = {
            let mut state = self.shared.lock();
            let row = self
                .staged
                .get(&id)
                .copied()
                .or_else(|| state.accounts.get(&id).copied());

            if let Some(remaining) = state.contention.get_mut(&id) {
                if *remaining > 0 {
                    *remaining -= 1;
                    if let Some(committed) = state.accounts.get_mut(&id) {
                        committed.version = committed.version.next();
                    }
                }
            }

            row.map(|row| Account {
                id,
                balance: row.balance,
                version: row.version,
            })
        };
        self.pause().await;
        Ok(found)
    }

    async fn conditional_update_balance(
        &mut self,
        id: AccountId,
        delta: Decimal,
        expected: Version,
    ) -> Result<u64, StoreError> {
        let affected = {
            let mut state = self.shared.lock();
            let held_elsewhere = state.claims.get(&id).is_some_and(|owner| *owner != self.id);
            let current = self
                .staged
                .get(&id)
                .copied()
                .or_else(|| state.accounts.get(&id).copied());

            match current {
                Some(row) if !held_elsewhere && row.version == expected => {
                    state.claims.insert(id, self.id);
                    self.claimed.insert(id);
                    self.staged.insert(
                        id,
                        Row {
                            balance: row.balance + delta,
                            version: row.version.next(),
                        },
                    );
                    1
                }
                _ => 0,
            }
        };
        self.pause().await;
        Ok(affected)
    }

    async fn append_transfer(
        &mut self,
        from: AccountId,
        to: AccountId,
        amount: Decimal,
    ) -> Result<TransferRecord, StoreError> {
        if self.shared.faults.fail_append.load(Ordering::SeqCst) {
            return Err(StoreError::backend("relation \"transactions\" is read-only"));
        }
        let record = {
            let mut state = self.shared.lock();
            state.next_log_id += 1;
            TransferRecord {
                id: state.next_log_id,
                from_account: from,
                to_account: to,
                amount,
                created_at: Utc::now(),
            }
        };
        self.staged_log.push(record.clone());
        self.pause().await;
        Ok(record)
    }

    async fn commit(mut self) -> Result<(), StoreError> {
        if self.shared.faults.fail_commit.load(Ordering::SeqCst) {
            return Err(StoreError::backend("could not serialize access"));
        }
        {
            let mut state = self.shared.lock();
            if self.staged.values().any(|row| row.balance < Decimal::ZERO) {
                return Err(StoreError::backend("violates check constraint \"chk_balance_non_negative\""));
            }
            for (id, row) in std::mem::take(&mut self.staged) {
                state.accounts.insert(id, row);
            }
            state.log.append(&mut self.staged_log);
        }
        self.shared.counters.commits.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn rollback(self) -> Result<(), StoreError> {
        self.shared.counters.rollbacks.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
