//! Shared setup for database integration tests.

#![allow(dead_code)]

use sea_orm::{ConnectOptions, Database};
use sea_orm_migration::MigratorTrait;
use tally_core::{Repositories, Services};
use tally_db::migration::Migrator;

/// Fresh migrated in-memory SQLite database.
///
/// One pooled connection, so every query sees the same memory database.
pub async fn repositories() -> Repositories {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options.max_connections(1).sqlx_logging(false);
    let db = Database::connect(options)
        .await
        .expect("Failed to open database");
    Migrator::up(&db, None).await.expect("Failed to migrate");
    tally_db::repositories(db)
}

pub async fn services() -> (Services, Repositories) {
    let repos = repositories().await;
    (Services::new(&repos), repos)
}
