//! Schema migration runner for Tally.
//!
//! Reads `DATABASE_URL` and accepts the usual sea-orm-migration commands:
//!   migrator up       - Apply pending migrations
//!   migrator down     - Roll back the last migration
//!   migrator status   - List applied and pending migrations
//!   migrator fresh    - Drop every table and migrate from scratch

use sea_orm_migration::prelude::*;
use tally_db::migration::Migrator;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    cli::run_cli(Migrator).await;
}
