//! Initial database migration.
//!
//! Creates the chart of accounts, the journal, the originating documents,
//! the stock ledger and the reconciliation tables. Identifiers and
//! timestamps are supplied by the application, so the DDL carries no
//! backend-specific defaults; only the money column type differs per
//! backend.

use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::DbBackend;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Placeholder replaced by the backend's money column type.
const MONEY: &str = "{money}";

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        let money = money_type(manager.get_database_backend());

        for statement in TABLES_SQL.iter().chain(INDEXES_SQL) {
            db.execute_unprepared(&statement.replace(MONEY, money))
                .await?;
        }
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        for table in DROP_ORDER {
            db.execute_unprepared(&format!("DROP TABLE IF EXISTS {table}"))
                .await?;
        }
        Ok(())
    }
}

/// Money column type. SQLite stores REAL so the driver can read values back
/// through its floating-point decoder.
fn money_type(backend: DbBackend) -> &'static str {
    match backend {
        DbBackend::Sqlite => "REAL",
        _ => "NUMERIC(19, 4)",
    }
}

const DROP_ORDER: [&str; 11] = [
    "bank_reconciliations",
    "bank_transactions",
    "payments",
    "purchase_orders",
    "stock_movements",
    "invoice_items",
    "invoices",
    "items",
    "journal_lines",
    "journal_headers",
    "accounts",
];

const TABLES_SQL: &[&str] = &[
    // Chart of accounts: two levels, deactivated rather than deleted
    r"
CREATE TABLE accounts (
    id UUID PRIMARY KEY,
    code VARCHAR(32) NOT NULL,
    name VARCHAR(255) NOT NULL,
    category VARCHAR(16) NOT NULL,
    role VARCHAR(32),
    parent_id UUID REFERENCES accounts(id),
    is_active BOOLEAN NOT NULL,
    opening_balance {money} NOT NULL,
    sort_order INTEGER NOT NULL,
    created_at TIMESTAMPTZ NOT NULL,
    updated_at TIMESTAMPTZ NOT NULL,
    CONSTRAINT uq_accounts_code UNIQUE (code),
    CONSTRAINT chk_accounts_category CHECK (category IN ('asset', 'liability', 'equity', 'income', 'expense')),
    CONSTRAINT chk_accounts_role CHECK (role IS NULL OR role IN ('cash', 'bank', 'receivable', 'payable', 'revenue_default')),
    CONSTRAINT chk_accounts_not_own_parent CHECK (parent_id IS NULL OR parent_id <> id)
)",
    // Journal headers: immutable, reference unique per kind
    r"
CREATE TABLE journal_headers (
    id UUID PRIMARY KEY,
    kind VARCHAR(32) NOT NULL,
    reference VARCHAR(64) NOT NULL,
    journal_date DATE NOT NULL,
    description TEXT NOT NULL,
    created_by UUID NOT NULL,
    branch_id UUID,
    reverses_journal_id UUID REFERENCES journal_headers(id),
    created_at TIMESTAMPTZ NOT NULL,
    CONSTRAINT uq_journal_headers_kind_reference UNIQUE (kind, reference),
    CONSTRAINT chk_journal_headers_kind CHECK (kind IN ('invoice', 'payment', 'deposit', 'purchase_order_payment', 'reversal', 'manual'))
)",
    // Journal lines: exactly one positive side
    r"
CREATE TABLE journal_lines (
    id UUID PRIMARY KEY,
    journal_id UUID NOT NULL REFERENCES journal_headers(id),
    line_no INTEGER NOT NULL,
    account_id UUID NOT NULL REFERENCES accounts(id),
    sub_account_id UUID REFERENCES accounts(id),
    debit {money} NOT NULL,
    credit {money} NOT NULL,
    description TEXT,
    branch_id UUID,
    reconciled BOOLEAN NOT NULL,
    reconciled_at DATE,
    created_at TIMESTAMPTZ NOT NULL,
    CONSTRAINT uq_journal_lines_position UNIQUE (journal_id, line_no),
    CONSTRAINT chk_journal_lines_non_negative CHECK (debit >= 0 AND credit >= 0),
    CONSTRAINT chk_journal_lines_one_side CHECK ((debit = 0) <> (credit = 0))
)",
    r"
CREATE TABLE items (
    id UUID PRIMARY KEY,
    code VARCHAR(64) NOT NULL,
    name VARCHAR(255) NOT NULL,
    item_type VARCHAR(16) NOT NULL,
    current_stock INTEGER NOT NULL,
    reorder_level INTEGER NOT NULL,
    unit_price {money} NOT NULL,
    income_account_id UUID REFERENCES accounts(id),
    is_active BOOLEAN NOT NULL,
    version BIGINT NOT NULL,
    created_at TIMESTAMPTZ NOT NULL,
    updated_at TIMESTAMPTZ NOT NULL,
    CONSTRAINT uq_items_code UNIQUE (code),
    CONSTRAINT chk_items_type CHECK (item_type IN ('inventory', 'service')),
    CONSTRAINT chk_items_stock_non_negative CHECK (current_stock >= 0),
    CONSTRAINT chk_items_price_non_negative CHECK (unit_price >= 0)
)",
    r"
CREATE TABLE invoices (
    id UUID PRIMARY KEY,
    invoice_number VARCHAR(64) NOT NULL,
    customer_name VARCHAR(255) NOT NULL,
    invoice_date DATE NOT NULL,
    due_date DATE,
    description TEXT,
    total_amount {money} NOT NULL,
    paid_amount {money} NOT NULL,
    status VARCHAR(16) NOT NULL,
    journal_id UUID REFERENCES journal_headers(id),
    created_by UUID NOT NULL,
    branch_id UUID,
    version BIGINT NOT NULL,
    created_at TIMESTAMPTZ NOT NULL,
    updated_at TIMESTAMPTZ NOT NULL,
    CONSTRAINT uq_invoices_number UNIQUE (invoice_number),
    CONSTRAINT chk_invoices_status CHECK (status IN ('pending', 'partial', 'paid')),
    CONSTRAINT chk_invoices_total_positive CHECK (total_amount > 0),
    CONSTRAINT chk_invoices_paid_range CHECK (paid_amount >= 0 AND paid_amount <= total_amount)
)",
    r"
CREATE TABLE invoice_items (
    id UUID PRIMARY KEY,
    invoice_id UUID NOT NULL REFERENCES invoices(id),
    line_no INTEGER NOT NULL,
    item_id UUID REFERENCES items(id),
    description TEXT NOT NULL,
    quantity INTEGER NOT NULL,
    unit_price {money} NOT NULL,
    amount {money} NOT NULL,
    income_account_id UUID NOT NULL REFERENCES accounts(id),
    income_sub_account_id UUID REFERENCES accounts(id),
    CONSTRAINT uq_invoice_items_position UNIQUE (invoice_id, line_no),
    CONSTRAINT chk_invoice_items_quantity CHECK (quantity > 0)
)",
    // Stock movements: append-only, one sequence number per item and change
    r"
CREATE TABLE stock_movements (
    id UUID PRIMARY KEY,
    item_id UUID NOT NULL REFERENCES items(id),
    sequence BIGINT NOT NULL,
    delta INTEGER NOT NULL,
    operation VARCHAR(16) NOT NULL,
    previous_stock INTEGER NOT NULL,
    new_stock INTEGER NOT NULL,
    actor_id UUID NOT NULL,
    origin_type VARCHAR(16) NOT NULL,
    origin_id UUID,
    created_at TIMESTAMPTZ NOT NULL,
    CONSTRAINT uq_stock_movements_sequence UNIQUE (item_id, sequence),
    CONSTRAINT chk_stock_movements_operation CHECK (operation IN ('add', 'subtract', 'set', 'adjustment')),
    CONSTRAINT chk_stock_movements_origin CHECK (origin_type IN ('invoice', 'adjustment', 'opening')),
    CONSTRAINT chk_stock_movements_arithmetic CHECK (new_stock = previous_stock + delta),
    CONSTRAINT chk_stock_movements_non_negative CHECK (new_stock >= 0)
)",
    r"
CREATE TABLE purchase_orders (
    id UUID PRIMARY KEY,
    po_number VARCHAR(64) NOT NULL,
    supplier_name VARCHAR(255) NOT NULL,
    order_date DATE NOT NULL,
    total_amount {money} NOT NULL,
    paid_amount {money} NOT NULL,
    status VARCHAR(16) NOT NULL,
    created_by UUID NOT NULL,
    version BIGINT NOT NULL,
    created_at TIMESTAMPTZ NOT NULL,
    updated_at TIMESTAMPTZ NOT NULL,
    CONSTRAINT uq_purchase_orders_number UNIQUE (po_number),
    CONSTRAINT chk_purchase_orders_status CHECK (status IN ('pending', 'partial', 'paid')),
    CONSTRAINT chk_purchase_orders_total_positive CHECK (total_amount > 0),
    CONSTRAINT chk_purchase_orders_paid_range CHECK (paid_amount >= 0 AND paid_amount <= total_amount)
)",
    // Payments: amount immutable, voided rather than deleted
    r"
CREATE TABLE payments (
    id UUID PRIMARY KEY,
    target_type VARCHAR(16) NOT NULL,
    target_id UUID,
    amount {money} NOT NULL,
    method VARCHAR(16) NOT NULL,
    payment_date DATE NOT NULL,
    reference VARCHAR(64) NOT NULL,
    status VARCHAR(16) NOT NULL,
    note TEXT,
    journal_id UUID NOT NULL REFERENCES journal_headers(id),
    void_journal_id UUID REFERENCES journal_headers(id),
    created_by UUID NOT NULL,
    created_at TIMESTAMPTZ NOT NULL,
    updated_at TIMESTAMPTZ NOT NULL,
    CONSTRAINT uq_payments_reference UNIQUE (reference),
    CONSTRAINT chk_payments_target CHECK (target_type IN ('invoice', 'purchase_order', 'general')),
    CONSTRAINT chk_payments_target_id CHECK ((target_type = 'general') = (target_id IS NULL)),
    CONSTRAINT chk_payments_method CHECK (method IN ('cash', 'bank_transfer', 'check', 'card', 'mobile_money')),
    CONSTRAINT chk_payments_status CHECK (status IN ('completed', 'voided')),
    CONSTRAINT chk_payments_amount_positive CHECK (amount > 0)
)",
    r"
CREATE TABLE bank_transactions (
    id UUID PRIMARY KEY,
    payment_id UUID NOT NULL REFERENCES payments(id),
    bank_account_id UUID NOT NULL REFERENCES accounts(id),
    amount {money} NOT NULL,
    direction VARCHAR(16) NOT NULL,
    method VARCHAR(16) NOT NULL,
    reference VARCHAR(64) NOT NULL,
    transaction_date DATE NOT NULL,
    created_at TIMESTAMPTZ NOT NULL,
    CONSTRAINT chk_bank_transactions_direction CHECK (direction IN ('deposit', 'withdrawal')),
    CONSTRAINT chk_bank_transactions_amount_positive CHECK (amount > 0)
)",
    r"
CREATE TABLE bank_reconciliations (
    id UUID PRIMARY KEY,
    statement_date DATE NOT NULL,
    bank_account_id UUID REFERENCES accounts(id),
    reconciled_count INTEGER NOT NULL,
    created_by UUID NOT NULL,
    created_at TIMESTAMPTZ NOT NULL,
    CONSTRAINT chk_bank_reconciliations_count CHECK (reconciled_count > 0)
)",
];

const INDEXES_SQL: &[&str] = &[
    // At most one active account per role
    "CREATE UNIQUE INDEX uq_accounts_active_role ON accounts(role) WHERE role IS NOT NULL AND is_active = TRUE",
    "CREATE INDEX idx_accounts_parent ON accounts(parent_id)",
    // A journal is reversed at most once
    "CREATE UNIQUE INDEX uq_journal_headers_reverses ON journal_headers(reverses_journal_id) WHERE reverses_journal_id IS NOT NULL",
    "CREATE INDEX idx_journal_headers_date ON journal_headers(journal_date)",
    "CREATE INDEX idx_journal_lines_journal ON journal_lines(journal_id)",
    "CREATE INDEX idx_journal_lines_account ON journal_lines(account_id)",
    "CREATE INDEX idx_journal_lines_sub_account ON journal_lines(sub_account_id)",
    "CREATE INDEX idx_journal_lines_unreconciled ON journal_lines(account_id) WHERE reconciled = FALSE",
    "CREATE INDEX idx_invoice_items_invoice ON invoice_items(invoice_id)",
    "CREATE INDEX idx_payments_target ON payments(target_type, target_id)",
    "CREATE INDEX idx_bank_transactions_payment ON bank_transactions(payment_id)",
];
