//! Database seeder for Fundline development and testing.
//!
//! Seeds the two demo accounts used by the walkthrough transfers:
//! 101 with 500.00 and 102 with 0.00. Accounts that already exist are left
//! untouched, so the seeder can be re-run.
//!
//! Usage: cargo run --bin seeder

use anyhow::Context;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use fundline_db::{AccountError, AccountRepository};
use fundline_shared::AppConfig;

const DEMO_ACCOUNTS: [(i64, Decimal); 2] = [(101, dec!(500.00)), (102, dec!(0.00))];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("Failed to load configuration")?;

    println!("Connecting to database...");
    let db = fundline_db::connect(&config.database)
        .await
        .context("Failed to connect to database")?;
    let repo = AccountRepository::new(db);

    println!("Seeding demo accounts...");
    for (id, balance) in DEMO_ACCOUNTS {
        match repo.create_account(id, balance).await {
            Ok(account) => println!("  Created account {} with balance {}", account.id, account.balance),
            Err(AccountError::AlreadyExists(id)) => println!("  Account {id} already exists, skipping"),
            Err(e) => return Err(e).context(format!("Failed to seed account {id}")),
        }
    }

    println!("Seeding complete!");
    Ok(())
}
