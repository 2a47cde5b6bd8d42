//! Shared setup for the repository integration tests.
//!
//! Every test gets its own in-memory SQLite database holding the migrated
//! schema and the default chart of accounts. The pool has a single
//! connection, so concurrent futures are serialized by the pool.
//!
//! Races between real connections need Postgres: [`TestLedger::postgres`]
//! connects to `BURSAR_TEST_DATABASE_URL` when it is set.

#![allow(dead_code)]

use bursar_core::ActorContext;
use bursar_core::accounts::{AccountInfo, default_chart};
use bursar_core::originators::{InvoiceLineInput, IssueInvoiceInput};
use bursar_db::migration::Migrator;
use bursar_db::repositories::NewItem;
use bursar_db::{AccountRepository, InvoiceRepository, StockRepository};
use bursar_shared::config::LedgerConfig;
use bursar_shared::types::{BranchId, UserId};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;
use uuid::Uuid;

/// Migrates and seeds the shared Postgres database once per test binary.
static POSTGRES_SCHEMA: tokio::sync::OnceCell<()> = tokio::sync::OnceCell::const_new();

/// A migrated database with the default chart seeded.
pub struct TestLedger {
    pub db: DatabaseConnection,
    pub config: LedgerConfig,
}

impl TestLedger {
    pub async fn new() -> Self {
        Self::with_config(LedgerConfig::default()).await
    }

    pub async fn with_config(config: LedgerConfig) -> Self {
        let mut options = ConnectOptions::new("sqlite::memory:");
        options
            .max_connections(1)
            .min_connections(1)
            .sqlx_logging(false);
        let db = Database::connect(options).await.unwrap();
        Migrator::up(&db, None).await.unwrap();

        let ledger = Self { db, config };
        ledger.accounts().seed_chart(&default_chart()).await.unwrap();
        ledger
    }

    /// Migrated and seeded Postgres ledger, or `None` when no test database
    /// is configured or reachable. Data persists between runs.
    pub async fn postgres(config: LedgerConfig) -> Option<Self> {
        let url = std::env::var("BURSAR_TEST_DATABASE_URL").ok()?;
        let mut options = ConnectOptions::new(url);
        options.max_connections(16).sqlx_logging(false);
        let db = match Database::connect(options).await {
            Ok(db) => db,
            Err(e) => {
                eprintln!("Skipping test - database not available: {e}");
                return None;
            }
        };
        let ledger = Self { db, config };
        POSTGRES_SCHEMA
            .get_or_init(|| async {
                Migrator::up(&ledger.db, None).await.unwrap();
                ledger.accounts().seed_chart(&default_chart()).await.unwrap();
            })
            .await;
        Some(ledger)
    }

    pub fn accounts(&self) -> AccountRepository {
        AccountRepository::new(self.db.clone(), &self.config)
    }

    pub fn invoices(&self) -> InvoiceRepository {
        InvoiceRepository::new(self.db.clone(), self.config.clone())
    }

    pub fn stock(&self) -> StockRepository {
        StockRepository::new(self.db.clone(), self.config.clone())
    }

    pub async fn account(&self, code: &str) -> AccountInfo {
        self.accounts().resolve_by_code(code).await.unwrap()
    }

    /// Issues a single-line service invoice for `amount`.
    pub async fn invoice_for(&self, amount: Decimal) -> bursar_db::repositories::IssuedInvoice {
        self.invoices()
            .issue_invoice(
                IssueInvoiceInput {
                    customer_name: "Ada Student".to_string(),
                    invoice_date: date(2026, 3, 2),
                    due_date: Some(date(2026, 3, 31)),
                    description: None,
                    lines: vec![InvoiceLineInput {
                        item_id: None,
                        description: "Term fees".to_string(),
                        quantity: 1,
                        unit_price: amount,
                        income_account_id: None,
                    }],
                },
                actor(),
            )
            .await
            .unwrap()
    }

    /// Registers an inventory item crediting `income_code` when sold.
    pub async fn inventory_item(
        &self,
        code: &str,
        opening_stock: i32,
        unit_price: Decimal,
        income_code: &str,
    ) -> bursar_db::entities::items::Model {
        let income = self.account(income_code).await;
        self.stock()
            .create_item(
                NewItem {
                    code: code.to_string(),
                    name: format!("Item {code}"),
                    item_type: bursar_core::inventory::ItemType::Inventory,
                    opening_stock,
                    reorder_level: 2,
                    unit_price,
                    income_account_id: Some(income.id),
                },
                actor(),
            )
            .await
            .unwrap()
    }
}

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

pub fn actor() -> ActorContext {
    ActorContext::new(UserId::from_uuid(Uuid::from_u128(1)))
}

pub fn branch_actor() -> ActorContext {
    actor().with_branch(BranchId::from_uuid(Uuid::from_u128(7)))
}
