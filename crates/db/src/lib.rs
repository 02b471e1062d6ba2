//! Database layer with `SeaORM` entities and repositories.
//!
//! This crate provides:
//! - `SeaORM` entity definitions
//! - Repository abstractions for data access
//! - Database migrations, portable across Postgres and SQLite

pub mod entities;
pub mod migration;
pub mod repositories;

pub use migration::Migrator;
pub use repositories::{
    AccountRepository, AuthEventRepository, BudgetRepository, JournalError, LedgerRepository,
    OrderRepository, SessionRepository, TradeRepository, UserRepository,
};

use std::time::Duration;

use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use sea_orm_migration::MigratorTrait;

/// Establishes a connection to the database with default pool settings.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    connect_with_pool(database_url, 10, 1).await
}

/// Establishes a pooled connection.
///
/// An in-memory SQLite database lives inside a single connection, so its
/// pool is pinned to exactly one.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect_with_pool(
    database_url: &str,
    max_connections: u32,
    min_connections: u32,
) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(database_url);

    if database_url.contains(":memory:") {
        options.max_connections(1).min_connections(1);
    } else {
        options
            .max_connections(max_connections)
            .min_connections(min_connections.min(max_connections));
    }

    options
        .connect_timeout(Duration::from_secs(10))
        .sqlx_logging(false);

    Database::connect(options).await
}

/// Connects to a fresh in-memory SQLite database with all migrations applied.
///
/// # Errors
///
/// Returns an error if connecting or migrating fails.
pub async fn connect_in_memory() -> Result<DatabaseConnection, DbErr> {
    let db = connect_with_pool("sqlite::memory:", 1, 1).await?;
    Migrator::up(&db, None).await?;
    Ok(db)
}
