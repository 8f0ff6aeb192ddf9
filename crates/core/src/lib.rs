//! Core business logic for Fundline.
//!
//! This crate contains pure transfer logic with ZERO web or database dependencies.
//! Persistence is reached through the [`transfer::LedgerStore`] and
//! [`transfer::UnitOfWork`] traits, implemented by `fundline-db`.
//!
//! # Modules
//!
//! - `transfer` - Two-account transfers with optimistic concurrency control

pub mod transfer;

pub use transfer::{
    Account, AccountId, AccountRole, ConflictPhase, LedgerStore, MONEY_SCALE, RetryPolicy,
    StoreError, TransferCoordinator, TransferError, TransferReceipt, TransferRecord,
    TransferRequest, UnitOfWork, Version, fits_money_scale,
};
