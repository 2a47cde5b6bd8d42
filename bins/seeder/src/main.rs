//! Seeds the default chart of accounts.
//!
//! Existing codes are left untouched, so running the seeder twice is safe.
//! Exits non-zero if any required role is still unassigned afterwards.
//!
//! Usage: cargo run --bin seeder

use anyhow::Context;
use bursar_core::accounts::{AccountRole, default_chart};
use bursar_db::{AccountRepository, connect_with, schema::verify_schema};
use bursar_shared::config::{AppConfig, LoggingConfig};
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("failed to load configuration")?;
    init_tracing(&config.logging);

    let db = connect_with(&config.database)
        .await
        .context("failed to connect to database")?;
    verify_schema(&db).await?;

    let accounts = AccountRepository::new(db, &config.ledger);
    let created = accounts.seed_chart(&default_chart()).await?;
    info!(created, "chart of accounts seeded");

    for account in accounts.ensure_required_roles(&AccountRole::REQUIRED).await? {
        if let Some(role) = account.role {
            info!(role = %role, code = %account.code, "role assigned");
        }
    }

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
