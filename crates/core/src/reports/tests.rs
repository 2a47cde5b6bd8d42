//! Tests for report generation.

use bursar_shared::types::DateRange;
use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use uuid::Uuid;

use super::service::ReportService;
use super::types::{AccountBalance, LedgerLine};
use crate::accounts::{AccountCategory, AccountInfo};
use crate::ledger::JournalKind;

fn info(code: &str, category: AccountCategory) -> AccountInfo {
    AccountInfo {
        id: Uuid::new_v4(),
        code: code.to_string(),
        name: format!("Account {code}"),
        category,
        role: None,
        parent_id: None,
        is_active: true,
    }
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn line(date: NaiveDate, debit: Decimal, credit: Decimal) -> LedgerLine {
    LedgerLine {
        line_id: Uuid::new_v4(),
        journal_id: Uuid::new_v4(),
        kind: JournalKind::Manual,
        reference: "JNL-2026-01-000001".to_string(),
        journal_date: date,
        line_no: 1,
        account_id: Uuid::new_v4(),
        sub_account_id: None,
        debit,
        credit,
        description: String::new(),
        branch_id: None,
        reconciled: false,
        reconciled_at: None,
    }
}

#[test]
fn test_account_balance_follows_normal_side() {
    let cash = AccountBalance::new(&info("1000", AccountCategory::Asset), dec!(50), dec!(100), dec!(30));
    assert_eq!(cash.balance, dec!(120));

    let revenue =
        AccountBalance::new(&info("4000", AccountCategory::Income), dec!(0), dec!(10), dec!(90));
    assert_eq!(revenue.balance, dec!(80));
}

#[test]
fn test_summarize_activity_folds_earlier_lines_into_opening() {
    let bank = info("1010", AccountCategory::Asset);
    let lines = [
        (date(2026, 1, 5), dec!(100), dec!(0)),
        (date(2026, 2, 1), dec!(40), dec!(0)),
        (date(2026, 2, 20), dec!(0), dec!(15)),
    ];

    let activity = ReportService::summarize_activity(
        &bank,
        dec!(10),
        &lines,
        DateRange::between(date(2026, 2, 1), date(2026, 2, 28)),
    );

    assert_eq!(activity.opening, dec!(110));
    assert_eq!(activity.debit, dec!(40));
    assert_eq!(activity.credit, dec!(15));
    assert_eq!(activity.closing, dec!(135));
}

#[test]
fn test_trial_balance_columns() {
    let accounts = vec![
        AccountBalance::new(&info("1000", AccountCategory::Asset), dec!(0), dec!(500), dec!(0)),
        AccountBalance::new(&info("4000", AccountCategory::Income), dec!(0), dec!(0), dec!(500)),
    ];

    let report = ReportService::generate_trial_balance(date(2026, 1, 31), accounts, dec!(0.01));

    assert_eq!(report.rows[0].debit_balance, dec!(500));
    assert_eq!(report.rows[1].credit_balance, dec!(500));
    assert!(report.totals.is_balanced);
}

#[test]
fn test_balance_sheet_includes_current_earnings() {
    let accounts = vec![
        AccountBalance::new(&info("1000", AccountCategory::Asset), dec!(0), dec!(700), dec!(0)),
        AccountBalance::new(&info("2000", AccountCategory::Liability), dec!(0), dec!(0), dec!(200)),
        AccountBalance::new(&info("4000", AccountCategory::Income), dec!(0), dec!(0), dec!(600)),
        AccountBalance::new(&info("5000", AccountCategory::Expense), dec!(0), dec!(100), dec!(0)),
    ];

    let report = ReportService::generate_balance_sheet(date(2026, 1, 31), accounts, dec!(0.01));

    assert_eq!(report.total_assets, dec!(700));
    assert_eq!(report.current_earnings, dec!(500));
    assert_eq!(report.total_equity, dec!(500));
    assert_eq!(report.liabilities_and_equity, dec!(700));
    assert!(report.is_balanced);
}

#[test]
fn test_income_statement() {
    let accounts = vec![
        AccountBalance::new(&info("4000", AccountCategory::Income), dec!(0), dec!(0), dec!(900)),
        AccountBalance::new(&info("5100", AccountCategory::Expense), dec!(0), dec!(250), dec!(0)),
        AccountBalance::new(&info("1000", AccountCategory::Asset), dec!(0), dec!(650), dec!(0)),
    ];

    let report = ReportService::generate_income_statement(
        DateRange::between(date(2026, 1, 1), date(2026, 1, 31)),
        accounts,
    );

    assert_eq!(report.income.total, dec!(900));
    assert_eq!(report.expenses.total, dec!(250));
    assert_eq!(report.net_income, dec!(650));
}

#[test]
fn test_general_ledger_running_balance() {
    let receivable = info("1100", AccountCategory::Asset);
    let lines = vec![
        line(date(2026, 1, 3), dec!(300), dec!(0)),
        line(date(2026, 1, 9), dec!(0), dec!(120)),
    ];

    let report = ReportService::build_general_ledger(
        &receivable,
        DateRange::between(date(2026, 1, 1), date(2026, 1, 31)),
        dec!(20),
        lines,
    );

    assert_eq!(report.entries[0].running_balance, dec!(320));
    assert_eq!(report.entries[1].running_balance, dec!(200));
    assert_eq!(report.closing_balance, dec!(200));
    assert_eq!(report.total_debit, dec!(300));
}

#[test]
fn test_inverted_range_rejected() {
    let range = DateRange::between(date(2026, 2, 1), date(2026, 1, 1));
    assert!(ReportService::validate_range(&range).is_err());
}

proptest! {
    /// Balanced journals keep the trial balance balanced: every posted pair
    /// of debit and credit lands in the two columns with equal weight.
    #[test]
    fn prop_trial_balance_balanced_for_balanced_postings(
        postings in prop::collection::vec((0usize..4, 0usize..4, 1i64..1_000_000i64), 1..30),
    ) {
        let accounts = [
            info("1000", AccountCategory::Asset),
            info("2000", AccountCategory::Liability),
            info("4000", AccountCategory::Income),
            info("5000", AccountCategory::Expense),
        ];
        let mut debits = [Decimal::ZERO; 4];
        let mut credits = [Decimal::ZERO; 4];
        for (debit_idx, credit_idx, cents) in postings {
            let amount = Decimal::new(cents, 2);
            debits[debit_idx] += amount;
            credits[credit_idx] += amount;
        }

        let balances = accounts
            .iter()
            .enumerate()
            .map(|(i, a)| AccountBalance::new(a, Decimal::ZERO, debits[i], credits[i]))
            .collect();

        let report = ReportService::generate_trial_balance(date(2026, 12, 31), balances, dec!(0.01));
        prop_assert_eq!(report.totals.total_debit, report.totals.total_credit);
        prop_assert!(report.totals.is_balanced);
    }

    /// Assets always equal liabilities plus equity for balanced postings.
    #[test]
    fn prop_balance_sheet_balances(
        postings in prop::collection::vec((0usize..5, 0usize..5, 1i64..1_000_000i64), 1..30),
    ) {
        let accounts = [
            info("1000", AccountCategory::Asset),
            info("2000", AccountCategory::Liability),
            info("3000", AccountCategory::Equity),
            info("4000", AccountCategory::Income),
            info("5000", AccountCategory::Expense),
        ];
        let mut debits = [Decimal::ZERO; 5];
        let mut credits = [Decimal::ZERO; 5];
        for (debit_idx, credit_idx, cents) in postings {
            let amount = Decimal::new(cents, 2);
            debits[debit_idx] += amount;
            credits[credit_idx] += amount;
        }

        let balances = accounts
            .iter()
            .enumerate()
            .map(|(i, a)| AccountBalance::new(a, Decimal::ZERO, debits[i], credits[i]))
            .collect();

        let report = ReportService::generate_balance_sheet(date(2026, 12, 31), balances, dec!(0.01));
        prop_assert_eq!(report.total_assets, report.liabilities_and_equity);
    }
}
