//! Chart of accounts: registration, role tags and deactivation.

mod common;

use bursar_core::LedgerError;
use bursar_core::accounts::{AccountCategory, AccountRole, NewAccount, default_chart};
use bursar_core::ledger::{JournalKind, JournalLineInput, PostJournalInput};
use bursar_db::JournalRepository;
use bursar_db::error::PostingError;
use bursar_db::repositories::AccountFilter;
use bursar_shared::config::{DeactivationPolicy, LedgerConfig};
use common::{TestLedger, actor, date};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn new_account(code: &str, category: AccountCategory) -> NewAccount {
    NewAccount {
        code: code.to_string(),
        name: format!("Account {code}"),
        category,
        role: None,
        parent_id: None,
        opening_balance: Decimal::ZERO,
        sort_order: 100,
    }
}

#[tokio::test]
async fn test_seeded_chart_carries_every_required_role() {
    let ledger = TestLedger::new().await;
    let accounts = ledger.accounts();

    let resolved = accounts
        .ensure_required_roles(&AccountRole::REQUIRED)
        .await
        .unwrap();
    assert_eq!(resolved.len(), AccountRole::REQUIRED.len());

    let bank = accounts.resolve_by_role(AccountRole::Bank).await.unwrap();
    assert_eq!(bank.code, "1010");

    // Seeding again creates nothing.
    assert_eq!(accounts.seed_chart(&default_chart()).await.unwrap(), 0);
}

#[tokio::test]
async fn test_duplicate_code_and_role_rejected() {
    let ledger = TestLedger::new().await;
    let accounts = ledger.accounts();

    let duplicate = accounts
        .create_account(new_account("1000", AccountCategory::Asset))
        .await
        .unwrap_err();
    assert!(matches!(
        duplicate,
        PostingError::Ledger(LedgerError::DuplicateCode(code)) if code == "1000"
    ));

    let mut second_cash = new_account("1001", AccountCategory::Asset);
    second_cash.role = Some(AccountRole::Cash);
    let err = accounts.create_account(second_cash).await.unwrap_err();
    assert!(matches!(err, PostingError::Ledger(LedgerError::Validation(_))));

    let mut wrong_category = new_account("2900", AccountCategory::Liability);
    wrong_category.role = Some(AccountRole::Receivable);
    let err = accounts.create_account(wrong_category).await.unwrap_err();
    assert!(matches!(err, PostingError::Ledger(LedgerError::Validation(_))));
}

#[tokio::test]
async fn test_sub_accounts_follow_their_parent() {
    let ledger = TestLedger::new().await;
    let accounts = ledger.accounts();
    let supplies = ledger.account("5300").await;

    let mut stationery = new_account("5300-01", AccountCategory::Expense);
    stationery.parent_id = Some(supplies.id);
    let created = accounts.create_account(stationery).await.unwrap();
    assert_eq!(created.parent_id, Some(supplies.id));

    let mut nested = new_account("5300-01-A", AccountCategory::Expense);
    nested.parent_id = Some(created.id);
    let err = accounts.create_account(nested).await.unwrap_err();
    assert!(matches!(err, PostingError::Ledger(LedgerError::Validation(_))));

    let mut mismatched = new_account("5300-02", AccountCategory::Asset);
    mismatched.parent_id = Some(supplies.id);
    let err = accounts.create_account(mismatched).await.unwrap_err();
    assert!(matches!(err, PostingError::Ledger(LedgerError::Validation(_))));

    let children = accounts
        .list_accounts(AccountFilter {
            parent_id: Some(supplies.id),
            ..AccountFilter::default()
        })
        .await
        .unwrap();
    assert_eq!(children.len(), 1);

    let expenses = accounts
        .list_accounts(AccountFilter {
            category: Some(AccountCategory::Expense),
            top_level_only: true,
            ..AccountFilter::default()
        })
        .await
        .unwrap();
    assert_eq!(expenses.len(), 4);
}

#[tokio::test]
async fn test_missing_role_reported() {
    let ledger = TestLedger::new().await;
    let accounts = ledger.accounts();
    let payable = ledger.account("2000").await;
    accounts.deactivate(payable.id, date(2026, 3, 1)).await.unwrap();

    let err = accounts
        .ensure_required_roles(&AccountRole::REQUIRED)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        PostingError::Ledger(LedgerError::MissingAccount {
            role: AccountRole::Payable
        })
    ));

    let active = accounts
        .list_accounts(AccountFilter {
            active_only: true,
            ..AccountFilter::default()
        })
        .await
        .unwrap();
    assert!(active.iter().all(|account| account.code != "2000"));
}

#[tokio::test]
async fn test_deactivation_policy_guards_open_period() {
    let config = LedgerConfig {
        deactivation_policy: DeactivationPolicy::RejectOpenUnreconciled,
        ..LedgerConfig::default()
    };
    let ledger = TestLedger::with_config(config).await;
    let supplies = ledger.account("5300").await;
    let cash = ledger.account("1000").await;

    JournalRepository::new(ledger.db.clone(), ledger.config.clone())
        .post(PostJournalInput {
            kind: JournalKind::Manual,
            journal_date: date(2026, 3, 3),
            reference: None,
            description: "Chalk".to_string(),
            actor: actor(),
            reverses_journal_id: None,
            lines: vec![
                JournalLineInput::debit(supplies.posting_target(), dec!(12.50)),
                JournalLineInput::credit(cash.posting_target(), dec!(12.50)),
            ],
        })
        .await
        .unwrap();

    let err = ledger
        .accounts()
        .deactivate(supplies.id, date(2026, 3, 20))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        PostingError::Ledger(LedgerError::ConstraintViolation(_))
    ));

    // Once the month has closed the unreconciled line no longer blocks.
    let deactivated = ledger
        .accounts()
        .deactivate(supplies.id, date(2026, 4, 2))
        .await
        .unwrap();
    assert!(!deactivated.is_active);
}

#[tokio::test]
async fn test_unknown_code_is_not_found() {
    let ledger = TestLedger::new().await;
    let err = ledger.accounts().resolve_by_code("9999").await.unwrap_err();
    assert!(matches!(
        err,
        PostingError::Ledger(LedgerError::AccountCodeNotFound(code)) if code == "9999"
    ));
}
