//! Database seeder for Million development and testing.
//!
//! Seeds a demo user with an opening cash deposit, a budget line and one
//! open trade. Safe to run repeatedly: every step is keyed so reruns leave
//! the data unchanged.
//!
//! Usage: cargo run --bin seeder

use anyhow::Context;
use chrono::{Duration, Utc};
use rust_decimal_macros::dec;
use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;
use tracing::info;
use uuid::Uuid;

use million_core::{
    auth::hash_password,
    budget::BudgetKind,
    ledger::CashDirection,
    trading::{Instrument, TradeAction},
};
use million_db::{
    BudgetRepository, LedgerRepository, Migrator, TradeRepository, UserRepository,
    repositories::{CashPosting, NewBudgetEntry, NewTrade},
};
use million_shared::types::CurrencyCode;

const DEMO_USERNAME: &str = "demo";
const DEMO_PASSWORD: &str = "Demo-Password-2024";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "million=info,seeder=info".into()),
        )
        .init();

    let database_url =
        std::env::var("DATABASE_URL").context("DATABASE_URL must be set in environment")?;

    info!("Connecting to database");
    let db = million_db::connect(&database_url).await?;
    Migrator::up(&db, None).await?;

    let user_id = seed_user(&db).await?;
    seed_cash(&db, user_id).await?;
    seed_budget(&db, user_id).await?;
    seed_trade(&db, user_id).await?;

    info!("Seeding complete");
    Ok(())
}

async fn seed_user(db: &DatabaseConnection) -> anyhow::Result<Uuid> {
    let users = UserRepository::new(db.clone());

    if let Some(user) = users.find_by_username(DEMO_USERNAME).await? {
        info!(username = DEMO_USERNAME, "Demo user already exists, skipping");
        return Ok(user.id);
    }

    let hash = hash_password(DEMO_PASSWORD)?;
    let user = users.create(DEMO_USERNAME, &hash).await?;
    info!(username = DEMO_USERNAME, password = DEMO_PASSWORD, "Created demo user");
    Ok(user.id)
}

async fn seed_cash(db: &DatabaseConnection, user_id: Uuid) -> anyhow::Result<()> {
    let posted = LedgerRepository::new(db.clone())
        .post_cash(CashPosting {
            user_id,
            direction: CashDirection::Deposit,
            amount: dec!(10000),
            currency: Some(CurrencyCode::default()),
            account_id: None,
            note: Some("Opening deposit".to_string()),
            effective_at: Some(Utc::now() - Duration::days(30)),
            idempotency_key: Some("seed-opening-deposit".to_string()),
        })
        .await?;

    if posted.created {
        info!(entry_id = %posted.entry.id, "Posted opening deposit");
    } else {
        info!("Opening deposit already posted, skipping");
    }
    Ok(())
}

async fn seed_budget(db: &DatabaseConnection, user_id: Uuid) -> anyhow::Result<()> {
    let budget = BudgetRepository::new(db.clone());

    if !budget.list(user_id).await?.is_empty() {
        info!("Budget lines already exist, skipping");
        return Ok(());
    }

    let today = Utc::now().date_naive();
    let lines = [
        ("Rent", BudgetKind::Expense, dec!(1800)),
        ("Groceries", BudgetKind::Expense, dec!(450)),
        ("Salary", BudgetKind::Income, dec!(6200)),
        ("Emergency fund", BudgetKind::Asset, dec!(500)),
    ];

    for (category, kind, amount) in lines {
        budget
            .create(NewBudgetEntry {
                user_id,
                category: category.to_string(),
                kind,
                amount,
                entry_date: today,
                description: None,
            })
            .await?;
    }
    info!(count = lines.len(), "Inserted budget lines");
    Ok(())
}

async fn seed_trade(db: &DatabaseConnection, user_id: Uuid) -> anyhow::Result<()> {
    let (trade, created) = TradeRepository::new(db.clone())
        .create(NewTrade {
            user_id,
            symbol: "AAPL".to_string(),
            instrument: Instrument::Stock,
            strategy: Some("long-term".to_string()),
            action: TradeAction::Buy,
            quantity: 10,
            entry_price: dec!(187.25),
            entry_date: Utc::now() - Duration::days(7),
            option_type: None,
            strike_price: None,
            expiry_date: None,
            client_order_id: Some("seed-aapl".to_string()),
        })
        .await?;

    if created {
        info!(trade_id = %trade.id, "Opened demo trade");
    } else {
        info!("Demo trade already exists, skipping");
    }
    Ok(())
}
