//! Tally API server.
//!
//! Serves the banking and treasury API over either the in-memory store or a
//! `SeaORM` database, depending on `database.url`.

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use tally_api::{AppState, create_router};
use tally_core::{Repositories, Services};
use tally_shared::AppConfig;
use tally_shared::config::LoggingConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("failed to load configuration")?;
    init_tracing(&config.logging);

    let repositories = if config.database.is_memory() {
        info!("Using in-memory store");
        Repositories::in_memory()
    } else {
        let db = tally_db::connect_and_migrate(&config.database)
            .await
            .context("failed to prepare database")?;
        info!("Connected to database");
        tally_db::repositories(db)
    };

    let app = create_router(AppState::new(Services::new(&repositories)));

    let addr = config.bind_address();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

fn init_tracing(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.filter));
    let registry = tracing_subscriber::registry().with(filter);

    if logging.json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}
