//! Database layer with `SeaORM` entities and repositories.
//!
//! This crate provides:
//! - `SeaORM` entity definitions
//! - [`SeaStore`], implementing every repository trait of `tally-core`
//! - Database migrations

pub mod entities;
pub mod migration;
pub mod repositories;

use std::sync::Arc;

pub use repositories::SeaStore;

use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use sea_orm_migration::MigratorTrait;
use tally_core::Repositories;
use tally_shared::config::DatabaseConfig;

/// Establishes a connection to the database.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    Database::connect(database_url).await
}

/// Opens a pool sized by `config` and applies every pending migration.
///
/// # Errors
///
/// Returns an error if the connection or a migration fails.
pub async fn connect_and_migrate(config: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(config.url.as_str());
    options
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .sqlx_logging(false);

    let db = Database::connect(options).await?;
    migration::Migrator::up(&db, None).await?;
    tracing::info!(
        max_connections = config.max_connections,
        "database migrations applied"
    );
    Ok(db)
}

/// Backs every repository with one [`SeaStore`] over `db`.
#[must_use]
pub fn repositories(db: DatabaseConnection) -> Repositories {
    let store = Arc::new(SeaStore::new(db));
    Repositories {
        customers: store.clone(),
        accounts: store.clone(),
        transactions: store.clone(),
        movements: store.clone(),
        tax_rates: store.clone(),
        taxpayers: store.clone(),
        filings: store.clone(),
        payments: store,
    }
}
