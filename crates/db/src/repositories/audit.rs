//! Audit repository: recomputes cached totals from authoritative records.
//!
//! Paid amounts are recomputed from completed payments, stock levels from
//! the movement trail, and journal totals from the stored lines. The audit
//! only reads; drift is reported, never repaired.

use std::collections::HashMap;

use bursar_core::ledger::JournalTotals;
use bursar_core::reconciliation::{
    CacheDrift, MovementRecord, check_journal_balance, check_settlement, check_stock_chain,
};
use bursar_shared::config::LedgerConfig;
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, QuerySelect};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::entities::{
    invoices, items, journal_lines, payments, purchase_orders,
    sea_orm_active_enums::{ItemType, PaymentStatus, PaymentTarget},
    stock_movements,
};
use crate::error::PostingError;

/// Outcome of a cache audit.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AuditReport {
    /// Every disagreement found.
    pub drifts: Vec<CacheDrift>,
    /// Invoices checked.
    pub invoices_checked: usize,
    /// Purchase orders checked.
    pub purchase_orders_checked: usize,
    /// Inventory items checked.
    pub items_checked: usize,
    /// Journals checked.
    pub journals_checked: usize,
}

impl AuditReport {
    /// Returns true when no drift was found.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.drifts.is_empty()
    }
}

/// Audit repository.
#[derive(Debug, Clone)]
pub struct AuditRepository {
    db: DatabaseConnection,
    tolerance: Decimal,
}

impl AuditRepository {
    /// Creates a new audit repository.
    #[must_use]
    pub fn new(db: DatabaseConnection, config: &LedgerConfig) -> Self {
        Self {
            db,
            tolerance: config.balance_tolerance,
        }
    }

    /// Runs every check and collects the drifts.
    ///
    /// # Errors
    ///
    /// Returns an error if a database query fails.
    pub async fn audit_caches(&self) -> Result<AuditReport, PostingError> {
        let mut report = AuditReport::default();

        let paid = self.completed_payments().await?;
        self.audit_invoices(&paid, &mut report).await?;
        self.audit_purchase_orders(&paid, &mut report).await?;
        self.audit_stock(&mut report).await?;
        self.audit_journals(&mut report).await?;

        if report.is_clean() {
            info!(
                invoices = report.invoices_checked,
                purchase_orders = report.purchase_orders_checked,
                items = report.items_checked,
                journals = report.journals_checked,
                "cache audit clean"
            );
        } else {
            warn!(drifts = report.drifts.len(), "cache audit found drift");
        }
        Ok(report)
    }

    /// Sum of completed payments per target.
    async fn completed_payments(
        &self,
    ) -> Result<HashMap<(PaymentTarget, Uuid), Decimal>, PostingError> {
        let rows: Vec<(PaymentTarget, Option<Uuid>, Decimal)> = payments::Entity::find()
            .filter(payments::Column::Status.eq(PaymentStatus::Completed))
            .select_only()
            .column(payments::Column::TargetType)
            .column(payments::Column::TargetId)
            .column(payments::Column::Amount)
            .into_tuple()
            .all(&self.db)
            .await?;

        let mut paid = HashMap::new();
        for (target_type, target_id, amount) in rows {
            if let Some(target_id) = target_id {
                *paid.entry((target_type, target_id)).or_insert(Decimal::ZERO) += amount;
            }
        }
        Ok(paid)
    }

    async fn audit_invoices(
        &self,
        paid: &HashMap<(PaymentTarget, Uuid), Decimal>,
        report: &mut AuditReport,
    ) -> Result<(), PostingError> {
        let invoices = invoices::Entity::find().all(&self.db).await?;
        for invoice in &invoices {
            let recomputed = paid
                .get(&(PaymentTarget::Invoice, invoice.id))
                .copied()
                .unwrap_or(Decimal::ZERO);
            report.drifts.extend(check_settlement(
                "invoice",
                invoice.id,
                invoice.total_amount,
                invoice.paid_amount,
                invoice.status.into(),
                recomputed,
            ));
        }
        report.invoices_checked = invoices.len();
        Ok(())
    }

    async fn audit_purchase_orders(
        &self,
        paid: &HashMap<(PaymentTarget, Uuid), Decimal>,
        report: &mut AuditReport,
    ) -> Result<(), PostingError> {
        let orders = purchase_orders::Entity::find().all(&self.db).await?;
        for order in &orders {
            let recomputed = paid
                .get(&(PaymentTarget::PurchaseOrder, order.id))
                .copied()
                .unwrap_or(Decimal::ZERO);
            report.drifts.extend(check_settlement(
                "purchase_order",
                order.id,
                order.total_amount,
                order.paid_amount,
                order.status.into(),
                recomputed,
            ));
        }
        report.purchase_orders_checked = orders.len();
        Ok(())
    }

    async fn audit_stock(&self, report: &mut AuditReport) -> Result<(), PostingError> {
        let items = items::Entity::find()
            .filter(items::Column::ItemType.eq(ItemType::Inventory))
            .all(&self.db)
            .await?;

        let movements = stock_movements::Entity::find()
            .order_by_asc(stock_movements::Column::ItemId)
            .order_by_asc(stock_movements::Column::Sequence)
            .all(&self.db)
            .await?;
        let mut trails: HashMap<Uuid, Vec<MovementRecord>> = HashMap::new();
        for movement in &movements {
            trails
                .entry(movement.item_id)
                .or_default()
                .push(MovementRecord::from(movement));
        }

        for item in &items {
            let trail = trails.get(&item.id).map_or(&[][..], Vec::as_slice);
            report
                .drifts
                .extend(check_stock_chain(item.id, item.current_stock, trail));
        }
        report.items_checked = items.len();
        Ok(())
    }

    async fn audit_journals(&self, report: &mut AuditReport) -> Result<(), PostingError> {
        let rows: Vec<(Uuid, Decimal, Decimal)> = journal_lines::Entity::find()
            .select_only()
            .column(journal_lines::Column::JournalId)
            .column(journal_lines::Column::Debit)
            .column(journal_lines::Column::Credit)
            .into_tuple()
            .all(&self.db)
            .await?;

        let mut totals: HashMap<Uuid, JournalTotals> = HashMap::new();
        for (journal_id, debit, credit) in rows {
            let entry = totals.entry(journal_id).or_default();
            entry.debit += debit;
            entry.credit += credit;
        }

        report.drifts.extend(
            totals
                .iter()
                .filter_map(|(id, sums)| check_journal_balance(*id, *sums, self.tolerance)),
        );
        report.journals_checked = totals.len();
        Ok(())
    }
}
