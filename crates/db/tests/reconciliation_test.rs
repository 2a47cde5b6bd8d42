//! Bank reconciliation of journal lines.

mod common;

use bursar_core::LedgerError;
use bursar_core::originators::{PaymentMethod, ReceivePaymentInput};
use bursar_db::entities::journal_lines;
use bursar_db::error::PostingError;
use bursar_db::{PaymentRepository, ReconciliationRepository};
use common::{TestLedger, actor, date};
use rust_decimal_macros::dec;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use uuid::Uuid;

async fn bank_lines(ledger: &TestLedger) -> (Uuid, Vec<Uuid>) {
    let bank = ledger.account("1010").await;
    let invoice = ledger.invoice_for(dec!(90.00)).await.invoice;
    let payments = PaymentRepository::new(ledger.db.clone(), ledger.config.clone());
    for amount in [dec!(30.00), dec!(60.00)] {
        payments
            .receive_invoice_payment(
                ReceivePaymentInput {
                    invoice_id: invoice.id,
                    amount,
                    method: PaymentMethod::BankTransfer,
                    payment_date: date(2026, 3, 9),
                    note: None,
                },
                actor(),
            )
            .await
            .unwrap();
    }

    let lines = journal_lines::Entity::find()
        .filter(journal_lines::Column::AccountId.eq(bank.id))
        .all(&ledger.db)
        .await
        .unwrap();
    (bank.id, lines.into_iter().map(|line| line.id).collect())
}

#[tokio::test]
async fn test_reconcile_is_idempotent() {
    let ledger = TestLedger::new().await;
    let (bank_id, lines) = bank_lines(&ledger).await;
    assert_eq!(lines.len(), 2);
    let reconciliations = ReconciliationRepository::new(ledger.db.clone(), ledger.config.clone());

    let first = reconciliations
        .reconcile_lines(&lines[..1], date(2026, 3, 31), actor(), Some(bank_id))
        .await
        .unwrap();
    assert_eq!(first.newly_reconciled, vec![lines[0]]);
    let record = first.reconciliation.unwrap();
    assert_eq!(record.reconciled_count, 1);
    assert_eq!(record.bank_account_id, Some(bank_id));

    // A later statement covering both lines only marks the new one.
    let second = reconciliations
        .reconcile_lines(&lines, date(2026, 4, 30), actor(), Some(bank_id))
        .await
        .unwrap();
    assert_eq!(second.newly_reconciled, vec![lines[1]]);
    assert_eq!(second.already_reconciled, vec![lines[0]]);

    let repeat = reconciliations
        .reconcile_lines(&lines, date(2026, 5, 31), actor(), Some(bank_id))
        .await
        .unwrap();
    assert!(repeat.reconciliation.is_none());
    assert!(repeat.newly_reconciled.is_empty());
    assert_eq!(repeat.already_reconciled.len(), 2);

    let first_line = journal_lines::Entity::find_by_id(lines[0])
        .one(&ledger.db)
        .await
        .unwrap()
        .unwrap();
    assert!(first_line.reconciled);
    assert_eq!(first_line.reconciled_at, Some(date(2026, 3, 31)));

    assert_eq!(reconciliations.list_reconciliations().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_unknown_line_fails_whole_batch() {
    let ledger = TestLedger::new().await;
    let (_, lines) = bank_lines(&ledger).await;
    let reconciliations = ReconciliationRepository::new(ledger.db.clone(), ledger.config.clone());

    let batch = vec![lines[0], Uuid::new_v4()];
    let err = reconciliations
        .reconcile_lines(&batch, date(2026, 3, 31), actor(), None)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        PostingError::Ledger(LedgerError::NotFound { .. })
    ));

    let line = journal_lines::Entity::find_by_id(lines[0])
        .one(&ledger.db)
        .await
        .unwrap()
        .unwrap();
    assert!(!line.reconciled);

    let empty = reconciliations
        .reconcile_lines(&[], date(2026, 3, 31), actor(), None)
        .await
        .unwrap_err();
    assert!(matches!(empty, PostingError::Ledger(LedgerError::Validation(_))));
}
