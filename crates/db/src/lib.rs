//! Database layer with `SeaORM` entities and repositories.
//!
//! This crate provides:
//! - `SeaORM` entity definitions
//! - Repositories for every posting operation
//! - Database migrations and a startup schema check
//! - Bounded retry of operations that lost a concurrency race

pub mod entities;
pub mod error;
pub mod migration;
pub mod repositories;
pub mod retry;
pub mod schema;

pub use error::PostingError;
pub use repositories::{
    AccountRepository, AuditRepository, DepositRepository, InvoiceRepository, JournalRepository,
    PaymentRepository, ReconciliationRepository, ReportRepository, ReversalRepository,
    StockRepository,
};

use std::time::Duration;

use bursar_shared::config::DatabaseConfig;
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};

/// Establishes a pooled connection from configuration.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect_with(config: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(config.url.clone());
    options
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .connect_timeout(Duration::from_secs(10))
        .sqlx_logging(false);
    Database::connect(options).await
}
