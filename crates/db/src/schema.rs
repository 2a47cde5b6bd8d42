//! Startup check that the database carries the schema this crate expects.

use sea_orm::{DatabaseConnection, DbErr};
use sea_orm_migration::{MigratorTrait, SchemaManager};

use crate::migration::Migrator;

/// Tables every posting operation relies on.
pub const REQUIRED_TABLES: [&str; 11] = [
    "accounts",
    "journal_headers",
    "journal_lines",
    "items",
    "stock_movements",
    "invoices",
    "invoice_items",
    "purchase_orders",
    "payments",
    "bank_transactions",
    "bank_reconciliations",
];

/// Error types for the schema check.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// Migrations have not all been applied.
    #[error("{0} pending migration(s); run the migrator first")]
    PendingMigrations(usize),

    /// A required table is absent.
    #[error("Required table '{0}' is missing")]
    MissingTable(&'static str),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Verifies that every migration is applied and every required table exists.
///
/// Binaries call this before doing any work.
///
/// # Errors
///
/// Returns the first problem found.
pub async fn verify_schema(db: &DatabaseConnection) -> Result<(), SchemaError> {
    let pending = Migrator::get_pending_migrations(db).await?;
    if !pending.is_empty() {
        return Err(SchemaError::PendingMigrations(pending.len()));
    }

    let manager = SchemaManager::new(db);
    for table in REQUIRED_TABLES {
        if !manager.has_table(table).await? {
            return Err(SchemaError::MissingTable(table));
        }
    }

    Ok(())
}
