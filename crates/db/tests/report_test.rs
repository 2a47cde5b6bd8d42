//! Financial reports recomputed from stored journal lines.

mod common;

use bursar_core::LedgerError;
use bursar_core::accounts::{AccountCategory, NewAccount};
use bursar_core::ledger::JournalKind;
use bursar_core::originators::{DepositInput, PaymentMethod, ReceivePaymentInput};
use bursar_core::reports::LineFilter;
use bursar_db::error::PostingError;
use bursar_db::{DepositRepository, PaymentRepository, ReportRepository};
use bursar_shared::types::{DateRange, PageRequest};
use common::{TestLedger, actor, branch_actor, date};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Invoice 100 of tuition, 40 received in cash, 320 of capital deposited.
async fn march_activity(ledger: &TestLedger) {
    let invoice = ledger.invoice_for(dec!(100.00)).await.invoice;
    PaymentRepository::new(ledger.db.clone(), ledger.config.clone())
        .receive_invoice_payment(
            ReceivePaymentInput {
                invoice_id: invoice.id,
                amount: dec!(40.00),
                method: PaymentMethod::Cash,
                payment_date: date(2026, 3, 10),
                note: None,
            },
            actor(),
        )
        .await
        .unwrap();

    let bank = ledger.account("1010").await;
    let equity = ledger.account("3000").await;
    DepositRepository::new(ledger.db.clone(), ledger.config.clone())
        .record_deposit(
            DepositInput {
                deposit_account_id: bank.id,
                deposit_sub_account_id: None,
                source_account_id: equity.id,
                source_sub_account_id: None,
                amount: dec!(320.00),
                deposit_date: date(2026, 3, 1),
                description: "Owner capital".to_string(),
            },
            branch_actor(),
        )
        .await
        .unwrap();
}

fn reports(ledger: &TestLedger) -> ReportRepository {
    ReportRepository::new(ledger.db.clone(), &ledger.config)
}

#[tokio::test]
async fn test_trial_balance_is_balanced() {
    let ledger = TestLedger::new().await;
    march_activity(&ledger).await;
    let receivable = ledger.account("1100").await;
    let equity = ledger.account("3000").await;

    let report = reports(&ledger).trial_balance(date(2026, 3, 31)).await.unwrap();

    assert!(report.totals.is_balanced);
    assert_eq!(report.totals.total_debit, dec!(420));
    assert_eq!(report.totals.total_credit, dec!(420));

    let row = |id: uuid::Uuid| report.rows.iter().find(|r| r.account.account_id == id).unwrap();
    assert_eq!(row(receivable.id).debit_balance, dec!(60));
    assert_eq!(row(equity.id).credit_balance, dec!(320));

    // Before any activity every balance is zero.
    let empty = reports(&ledger).trial_balance(date(2026, 2, 28)).await.unwrap();
    assert_eq!(empty.totals.total_debit, Decimal::ZERO);
    assert!(empty.totals.is_balanced);
}

#[tokio::test]
async fn test_balance_sheet_includes_current_earnings() {
    let ledger = TestLedger::new().await;
    march_activity(&ledger).await;

    let sheet = reports(&ledger).balance_sheet(date(2026, 3, 31)).await.unwrap();

    assert_eq!(sheet.total_assets, dec!(420));
    assert_eq!(sheet.total_liabilities, Decimal::ZERO);
    assert_eq!(sheet.current_earnings, dec!(100));
    assert_eq!(sheet.liabilities_and_equity, dec!(420));
    assert!(sheet.is_balanced);
}

#[tokio::test]
async fn test_income_statement_covers_only_the_period() {
    let ledger = TestLedger::new().await;
    march_activity(&ledger).await;
    let reports = reports(&ledger);

    let march = reports
        .income_statement(DateRange::between(date(2026, 3, 1), date(2026, 3, 31)))
        .await
        .unwrap();
    assert_eq!(march.income.total, dec!(100));
    assert_eq!(march.expenses.total, Decimal::ZERO);
    assert_eq!(march.net_income, dec!(100));

    let april = reports
        .income_statement(DateRange::between(date(2026, 4, 1), date(2026, 4, 30)))
        .await
        .unwrap();
    assert_eq!(april.net_income, Decimal::ZERO);

    let inverted = reports
        .income_statement(DateRange::between(date(2026, 4, 30), date(2026, 4, 1)))
        .await
        .unwrap_err();
    assert!(matches!(inverted, PostingError::Ledger(LedgerError::Validation(_))));
}

#[tokio::test]
async fn test_general_ledger_running_balance() {
    let ledger = TestLedger::new().await;
    march_activity(&ledger).await;
    let receivable = ledger.account("1100").await;

    let report = reports(&ledger)
        .general_ledger(
            receivable.id,
            DateRange::between(date(2026, 3, 1), date(2026, 3, 31)),
        )
        .await
        .unwrap();

    assert_eq!(report.code, "1100");
    assert_eq!(report.opening_balance, Decimal::ZERO);
    let running: Vec<Decimal> = report.entries.iter().map(|e| e.running_balance).collect();
    assert_eq!(running, vec![dec!(100), dec!(60)]);
    assert_eq!(report.total_debit, dec!(100));
    assert_eq!(report.total_credit, dec!(40));
    assert_eq!(report.closing_balance, dec!(60));

    let april = reports(&ledger)
        .general_ledger(
            receivable.id,
            DateRange::between(date(2026, 4, 1), date(2026, 4, 30)),
        )
        .await
        .unwrap();
    assert_eq!(april.opening_balance, dec!(60));
    assert!(april.entries.is_empty());
    assert_eq!(april.closing_balance, dec!(60));
}

#[tokio::test]
async fn test_parent_balance_rolls_up_sub_accounts() {
    let ledger = TestLedger::new().await;
    let sales = ledger.account("4100").await;
    let uniforms = ledger.account("4100-01").await;
    let item = ledger.inventory_item("UNI-S", 10, dec!(25.00), "4100-01").await;
    ledger
        .invoices()
        .issue_invoice(
            bursar_core::originators::IssueInvoiceInput {
                customer_name: "Parent".to_string(),
                invoice_date: date(2026, 3, 4),
                due_date: None,
                description: None,
                lines: vec![bursar_core::originators::InvoiceLineInput {
                    item_id: Some(item.id),
                    description: "Uniform".to_string(),
                    quantity: 2,
                    unit_price: dec!(25.00),
                    income_account_id: None,
                }],
            },
            actor(),
        )
        .await
        .unwrap();

    let reports = reports(&ledger);
    let range = DateRange::up_to(date(2026, 3, 31));
    let parent = reports.account_balance(sales.id, range).await.unwrap();
    let child = reports.account_balance(uniforms.id, range).await.unwrap();
    assert_eq!(parent.closing, dec!(50));
    assert_eq!(child.closing, dec!(50));

    // The trial balance lists the amount once, on the leaf.
    let trial = reports.trial_balance(date(2026, 3, 31)).await.unwrap();
    let credit_of = |id: uuid::Uuid| {
        trial
            .rows
            .iter()
            .find(|r| r.account.account_id == id)
            .map_or(Decimal::ZERO, |r| r.credit_balance)
    };
    assert_eq!(credit_of(uniforms.id), dec!(50));
    assert_eq!(credit_of(sales.id), Decimal::ZERO);
    assert!(trial.totals.is_balanced);
}

#[tokio::test]
async fn test_list_lines_filters_and_pages() {
    let ledger = TestLedger::new().await;
    march_activity(&ledger).await;
    let reports = reports(&ledger);

    let all = reports
        .list_lines(&LineFilter::default(), &PageRequest::default())
        .await
        .unwrap();
    assert_eq!(all.meta.total, 6);
    assert_eq!(all.data[0].kind, JournalKind::Deposit);

    let page = reports
        .list_lines(
            &LineFilter::default(),
            &PageRequest {
                page: 2,
                per_page: 4,
            },
        )
        .await
        .unwrap();
    assert_eq!(page.data.len(), 2);
    assert_eq!(page.meta.total_pages, 2);

    let payments = reports
        .list_lines(
            &LineFilter {
                kind: Some(JournalKind::Payment),
                ..LineFilter::default()
            },
            &PageRequest::default(),
        )
        .await
        .unwrap();
    assert_eq!(payments.meta.total, 2);
    assert!(payments.data.iter().all(|line| line.reference == "PAY-2026-03-000001"));

    let branch_lines = reports
        .list_lines(
            &LineFilter {
                branch_id: branch_actor().branch_id,
                ..LineFilter::default()
            },
            &PageRequest::default(),
        )
        .await
        .unwrap();
    assert_eq!(branch_lines.meta.total, 2);

    let reconciled = reports
        .list_lines(
            &LineFilter {
                reconciled: Some(true),
                ..LineFilter::default()
            },
            &PageRequest::default(),
        )
        .await
        .unwrap();
    assert_eq!(reconciled.meta.total, 0);
}

#[tokio::test]
async fn test_unknown_account_balance() {
    let ledger = TestLedger::new().await;
    let err = reports(&ledger)
        .account_balance(uuid::Uuid::new_v4(), DateRange::default())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        PostingError::Ledger(LedgerError::AccountNotFound(_))
    ));
}

#[tokio::test]
async fn test_parent_opening_includes_sub_account_openings() {
    let ledger = TestLedger::new().await;
    let accounts = ledger.accounts();
    let petty = accounts
        .create_account(NewAccount {
            code: "1500".to_string(),
            name: "Petty Cash Floats".to_string(),
            category: AccountCategory::Asset,
            role: None,
            parent_id: None,
            opening_balance: dec!(20.00),
            sort_order: 50,
        })
        .await
        .unwrap();
    let office = accounts
        .create_account(NewAccount {
            code: "1500-01".to_string(),
            name: "Office Float".to_string(),
            category: AccountCategory::Asset,
            role: None,
            parent_id: Some(petty.id),
            opening_balance: dec!(100.00),
            sort_order: 51,
        })
        .await
        .unwrap();
    let equity = ledger.account("3000").await;
    DepositRepository::new(ledger.db.clone(), ledger.config.clone())
        .record_deposit(
            DepositInput {
                deposit_account_id: petty.id,
                deposit_sub_account_id: Some(office.id),
                source_account_id: equity.id,
                source_sub_account_id: None,
                amount: dec!(50.00),
                deposit_date: date(2026, 3, 5),
                description: "Float top-up".to_string(),
            },
            branch_actor(),
        )
        .await
        .unwrap();

    let reports = reports(&ledger);
    let range = DateRange::up_to(date(2026, 3, 31));
    let parent = reports.account_balance(petty.id, range).await.unwrap();
    let child = reports.account_balance(office.id, range).await.unwrap();
    assert_eq!(parent.opening, dec!(120));
    assert_eq!(parent.closing, dec!(170));
    assert_eq!(child.opening, dec!(100));
    assert_eq!(child.closing, dec!(150));

    let april = reports
        .general_ledger(
            petty.id,
            DateRange::between(date(2026, 4, 1), date(2026, 4, 30)),
        )
        .await
        .unwrap();
    assert_eq!(april.opening_balance, dec!(170));
    assert_eq!(april.closing_balance, dec!(170));
}
