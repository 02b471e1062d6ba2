//! Database migrations.
//!
//! Migrations are managed using sea-orm-migration. Tables are derived from the
//! entity definitions so the same migrations run on Postgres and SQLite.

pub use sea_orm_migration::prelude::*;

mod m20261019_000001_auth;
mod m20261019_000002_ledger;
mod m20261019_000003_journal;

/// Migrator for running database migrations.
pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20261019_000001_auth::Migration),
            Box::new(m20261019_000002_ledger::Migration),
            Box::new(m20261019_000003_journal::Migration),
        ]
    }
}
