//! Two-account transfers under optimistic concurrency control.
//!
//! This module implements the transfer protocol:
//! - Domain types for accounts, requests and log records
//! - Error taxonomy with stable API codes
//! - Request validation performed before any unit of work is opened
//! - Retry policy for version conflicts
//! - Storage seam traits (`LedgerStore`, `UnitOfWork`)
//! - The `TransferCoordinator` that drives read-validate-write-write-log

pub mod coordinator;
pub mod error;
pub mod policy;
pub mod store;
pub mod types;
pub mod validation;

#[cfg(test)]
mod coordinator_props;
#[cfg(test)]
pub(crate) mod memory;

pub use coordinator::TransferCoordinator;
pub use error::{StoreError, TransferError};
pub use policy::RetryPolicy;
pub use store::{LedgerStore, UnitOfWork};
pub use types::{
    Account, AccountId, AccountRole, ConflictPhase, MONEY_SCALE, TransferReceipt, TransferRecord,
    TransferRequest, Version, fits_money_scale,
};
pub use validation::validate_transfer;
