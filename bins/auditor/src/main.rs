//! Recomputes cached paid amounts, statuses, stock levels and journal
//! totals from the underlying records and prints every drift found.
//!
//! Exits with status 1 when drift is found.
//!
//! Usage: cargo run --bin auditor

use anyhow::Context;
use bursar_db::{AuditRepository, connect_with, schema::verify_schema};
use bursar_shared::config::{AppConfig, LoggingConfig};
use tracing::{info, warn};
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

    let report = AuditRepository::new(db, &config.ledger)
        .audit_caches()
        .await?;

    for drift in &report.drifts {
        warn!(drift = %serde_json::to_string(drift)?, "cache drift");
    }
    println!("{}", serde_json::to_string_pretty(&report)?);

    if report.is_clean() {
        info!("no drift found");
        Ok(())
    } else {
        std::process::exit(1);
    }
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
