//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.

pub mod account;
pub mod transaction_log;

pub use account::{AccountError, AccountRepository};
pub use transaction_log::TransactionLogRepository;
