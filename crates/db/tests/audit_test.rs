//! Cache audit: cached totals against the records they summarize.

mod common;

use bursar_core::inventory::StockOperation;
use bursar_core::originators::{PaymentMethod, ReceivePaymentInput};
use bursar_core::reconciliation::CacheDrift;
use bursar_db::entities::{invoices, items, journal_lines};
use bursar_db::{AuditRepository, PaymentRepository};
use common::{TestLedger, actor, date};
use rust_decimal_macros::dec;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, sea_query::Expr};

async fn busy_ledger() -> TestLedger {
    let ledger = TestLedger::new().await;
    let item = ledger.inventory_item("UNI-S", 8, dec!(25.00), "4100-01").await;
    ledger
        .stock()
        .adjust_stock(item.id, -1, StockOperation::Adjustment, actor())
        .await
        .unwrap();

    let invoice = ledger.invoice_for(dec!(120.00)).await.invoice;
    PaymentRepository::new(ledger.db.clone(), ledger.config.clone())
        .receive_invoice_payment(
            ReceivePaymentInput {
                invoice_id: invoice.id,
                amount: dec!(20.50),
                method: PaymentMethod::MobileMoney,
                payment_date: date(2026, 3, 8),
                note: None,
            },
            actor(),
        )
        .await
        .unwrap();
    ledger
}

fn audit(ledger: &TestLedger) -> AuditRepository {
    AuditRepository::new(ledger.db.clone(), &ledger.config)
}

#[tokio::test]
async fn test_consistent_ledger_is_clean() {
    let ledger = busy_ledger().await;

    let report = audit(&ledger).audit_caches().await.unwrap();

    assert!(report.is_clean(), "unexpected drift: {:?}", report.drifts);
    assert_eq!(report.invoices_checked, 1);
    assert_eq!(report.items_checked, 1);
    assert_eq!(report.journals_checked, 2);
}

#[tokio::test]
async fn test_tampered_caches_reported() {
    let ledger = busy_ledger().await;

    invoices::Entity::update_many()
        .col_expr(invoices::Column::PaidAmount, Expr::value(dec!(50.00)))
        .exec(&ledger.db)
        .await
        .unwrap();
    items::Entity::update_many()
        .col_expr(items::Column::CurrentStock, Expr::value(3))
        .exec(&ledger.db)
        .await
        .unwrap();
    let line = journal_lines::Entity::find()
        .filter(journal_lines::Column::Debit.gt(dec!(0)))
        .one(&ledger.db)
        .await
        .unwrap()
        .unwrap();
    journal_lines::Entity::update_many()
        .col_expr(journal_lines::Column::Debit, Expr::value(line.debit + dec!(5)))
        .filter(journal_lines::Column::Id.eq(line.id))
        .exec(&ledger.db)
        .await
        .unwrap();

    let report = audit(&ledger).audit_caches().await.unwrap();

    assert!(!report.is_clean());
    assert!(report.drifts.iter().any(|d| matches!(
        d,
        CacheDrift::PaidAmount { cached, recomputed, .. }
            if *cached == dec!(50) && *recomputed == dec!(20.5)
    )));
    assert!(report.drifts.iter().any(|d| matches!(
        d,
        CacheDrift::StockLevel { cached: 3, recomputed: 7, .. }
    )));
    assert!(report.drifts.iter().any(|d| matches!(
        d,
        CacheDrift::UnbalancedJournal { journal_id, .. } if *journal_id == line.journal_id
    )));
}
