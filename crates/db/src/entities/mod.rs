//! `SeaORM` entity definitions.

pub mod accounts;
pub mod transactions;
