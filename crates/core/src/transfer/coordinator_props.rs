//! Property-based tests for TransferCoordinator.
//!
//! - Conservation: the sum of all balances never changes
//! - Non-negativity: no balance ever drops below zero
//! - Log integrity: exactly one log row per committed transfer

use std::time::Duration;

use proptest::prelude::*;
use rust_decimal::Decimal;

use super::coordinator::TransferCoordinator;
use super::error::TransferError;
use super::memory::InMemoryLedger;
use super::policy::RetryPolicy;
use super::types::{AccountId, TransferRequest};

const ACCOUNTS: [AccountId; 3] = [101, 102, 103];

/// Strategy to generate non-negative opening balances (0.00 to 1,000.00).
fn opening_balance() -> impl Strategy<Value = Decimal> {
    (0i64..=100_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy to generate transfer amounts, including non-positive ones.
fn amount() -> impl Strategy<Value = Decimal> {
    prop_oneof![
        8 => (1i64..=60_000i64).prop_map(|cents| Decimal::new(cents, 2)),
        1 => Just(Decimal::ZERO),
        1 => (1i64..=1_000i64).prop_map(|cents| Decimal::new(-cents, 2)),
    ]
}

/// Strategy to generate a transfer between two of the known accounts.
fn request() -> impl Strategy<Value = TransferRequest> {
    (0usize..3, 0usize..3, amount())
        .prop_map(|(from, to, amount)| TransferRequest::new(ACCOUNTS[from], ACCOUNTS[to], amount))
}

fn run<F: std::future::Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .unwrap()
        .block_on(future)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_sequential_transfers_conserve_money(
        balances in proptest::collection::vec(opening_balance(), 3),
        requests in proptest::collection::vec(request(), 1..25),
    ) {
        let mut ledger = InMemoryLedger::new();
        for (id, balance) in ACCOUNTS.iter().zip(&balances) {
            ledger = ledger.with_account(*id, *balance);
        }
        let total_before = ledger.total_balance();
        let coordinator = TransferCoordinator::new(ledger, RetryPolicy::new(3, Duration::ZERO));

        let mut committed = 0usize;
        for request in requests {
            let before_from = coordinator.store().balance(request.from).unwrap();
            let before_to = coordinator.store().balance(request.to).unwrap();

            match run(coordinator.transfer(request)) {
                Ok(receipt) => {
                    committed += 1;
                    prop_assert_eq!(receipt.attempts, 1);
                    prop_assert_eq!(
                        coordinator.store().balance(request.from).unwrap(),
                        before_from - request.amount
                    );
                    prop_assert_eq!(
                        coordinator.store().balance(request.to).unwrap(),
                        before_to + request.amount
                    );
                    let log = coordinator.store().log();
                    let last = log.last().unwrap();
                    prop_assert_eq!(last.id, receipt.transaction_id);
                    prop_assert_eq!(
                        (last.from_account, last.to_account, last.amount),
                        (request.from, request.to, request.amount)
                    );
                }
                Err(TransferError::InsufficientFunds { available, requested, .. }) => {
                    prop_assert!(available < requested);
                    prop_assert_eq!(coordinator.store().balance(request.from).unwrap(), before_from);
                    prop_assert_eq!(coordinator.store().balance(request.to).unwrap(), before_to);
                }
                Err(TransferError::InvalidAmount(amount)) => {
                    prop_assert!(amount <= Decimal::ZERO);
                }
                Err(TransferError::SameAccount(id)) => {
                    prop_assert_eq!(id, request.to);
                }
                Err(other) => prop_assert!(false, "unexpected error: {}", other),
            }

            for id in ACCOUNTS {
                prop_assert!(coordinator.store().balance(id).unwrap() >= Decimal::ZERO);
            }
        }

        prop_assert_eq!(coordinator.store().total_balance(), total_before);
        prop_assert_eq!(coordinator.store().log().len(), committed);
    }

    #[test]
    fn prop_overdraft_always_rejected(
        balance in opening_balance(),
        excess in (1i64..=10_000i64).prop_map(|cents| Decimal::new(cents, 2)),
    ) {
        let ledger = InMemoryLedger::new()
            .with_account(101, balance)
            .with_account(102, Decimal::ZERO);
        let coordinator = TransferCoordinator::new(ledger, RetryPolicy::default());

        let err = run(coordinator.transfer(TransferRequest::new(101, 102, balance + excess)))
            .unwrap_err();

        let is_insufficient = matches!(err, TransferError::InsufficientFunds { .. });
        prop_assert!(is_insufficient);
        prop_assert_eq!(coordinator.store().balance(101), Some(balance));
        prop_assert_eq!(coordinator.store().version(101), Some(1));
        prop_assert!(coordinator.store().log().is_empty());
    }
}
