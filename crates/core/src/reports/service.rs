//! Report generation service.

use bursar_shared::types::{DateRange, within_tolerance};
use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::types::{
    AccountActivity, AccountBalance, BalanceSheetReport, GeneralLedgerEntry, GeneralLedgerReport,
    IncomeStatementReport, LedgerLine, ReportSection, TrialBalanceReport, TrialBalanceRow,
    TrialBalanceTotals,
};
use crate::accounts::{AccountCategory, AccountInfo, NormalBalance};
use crate::ledger::LedgerError;

/// Service for generating financial reports.
pub struct ReportService;

impl ReportService {
    /// Rejects ranges whose start falls after their end.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::Validation` for an inverted range.
    pub fn validate_range(range: &DateRange) -> Result<(), LedgerError> {
        if range.is_valid() {
            Ok(())
        } else {
            Err(LedgerError::Validation(format!(
                "invalid date range: {:?} is after {:?}",
                range.from, range.to
            )))
        }
    }

    /// Summarises an account's activity over `range`.
    ///
    /// `opening_balance` is the stored opening balance (own plus
    /// sub-accounts'). `lines` are the account's lines up to the end of the
    /// range as `(date, debit, credit)`; those dated before the range fold
    /// into the opening figure.
    #[must_use]
    pub fn summarize_activity(
        info: &AccountInfo,
        opening_balance: Decimal,
        lines: &[(NaiveDate, Decimal, Decimal)],
        range: DateRange,
    ) -> AccountActivity {
        let normal = info.category.normal_balance();
        let mut opening = opening_balance;
        let mut debit = Decimal::ZERO;
        let mut credit = Decimal::ZERO;

        for (date, line_debit, line_credit) in lines {
            if range.is_before(*date) {
                opening += normal.net_change(*line_debit, *line_credit);
            } else if range.contains(*date) {
                debit += *line_debit;
                credit += *line_credit;
            }
        }

        AccountActivity {
            account_id: info.id,
            category: info.category,
            range,
            opening,
            debit,
            credit,
            closing: opening + normal.net_change(debit, credit),
        }
    }

    /// Generates a trial balance report from account balances.
    ///
    /// Each balance lands in the debit or credit column by its sign
    /// relative to the account's normal side.
    #[must_use]
    pub fn generate_trial_balance(
        as_of: NaiveDate,
        accounts: Vec<AccountBalance>,
        tolerance: Decimal,
    ) -> TrialBalanceReport {
        let rows: Vec<TrialBalanceRow> = accounts
            .into_iter()
            .map(|account| {
                let debit_side = match account.category.normal_balance() {
                    NormalBalance::Debit => account.balance,
                    NormalBalance::Credit => -account.balance,
                };
                let (debit_balance, credit_balance) = if debit_side >= Decimal::ZERO {
                    (debit_side, Decimal::ZERO)
                } else {
                    (Decimal::ZERO, -debit_side)
                };
                TrialBalanceRow {
                    account,
                    debit_balance,
                    credit_balance,
                }
            })
            .collect();

        let total_debit: Decimal = rows.iter().map(|r| r.debit_balance).sum();
        let total_credit: Decimal = rows.iter().map(|r| r.credit_balance).sum();

        TrialBalanceReport {
            report_type: "trial_balance".to_string(),
            as_of,
            rows,
            totals: TrialBalanceTotals {
                total_debit,
                total_credit,
                is_balanced: within_tolerance(total_debit, total_credit, tolerance),
            },
        }
    }

    /// Generates a balance sheet report from account balances.
    ///
    /// Income and expense balances are carried into equity as current
    /// earnings, so the sheet balances before any period close.
    #[must_use]
    pub fn generate_balance_sheet(
        as_of: NaiveDate,
        accounts: Vec<AccountBalance>,
        tolerance: Decimal,
    ) -> BalanceSheetReport {
        let mut assets = ReportSection::default();
        let mut liabilities = ReportSection::default();
        let mut equity = ReportSection::default();
        let mut current_earnings = Decimal::ZERO;

        for account in accounts {
            match account.category {
                AccountCategory::Asset => Self::add_to_section(&mut assets, account),
                AccountCategory::Liability => Self::add_to_section(&mut liabilities, account),
                AccountCategory::Equity => Self::add_to_section(&mut equity, account),
                AccountCategory::Income => current_earnings += account.balance,
                AccountCategory::Expense => current_earnings -= account.balance,
            }
        }

        let total_assets = assets.total;
        let total_liabilities = liabilities.total;
        let total_equity = equity.total + current_earnings;
        let liabilities_and_equity = total_liabilities + total_equity;

        BalanceSheetReport {
            report_type: "balance_sheet".to_string(),
            as_of,
            assets,
            liabilities,
            equity,
            current_earnings,
            total_assets,
            total_liabilities,
            total_equity,
            liabilities_and_equity,
            is_balanced: within_tolerance(total_assets, liabilities_and_equity, tolerance),
        }
    }

    /// Generates an income statement report from account balances.
    ///
    /// Balances are expected to cover only the period's activity.
    #[must_use]
    pub fn generate_income_statement(
        period: DateRange,
        accounts: Vec<AccountBalance>,
    ) -> IncomeStatementReport {
        let mut income = ReportSection::default();
        let mut expenses = ReportSection::default();

        for account in accounts {
            match account.category {
                AccountCategory::Income => Self::add_to_section(&mut income, account),
                AccountCategory::Expense => Self::add_to_section(&mut expenses, account),
                _ => {}
            }
        }

        let net_income = income.total - expenses.total;
        IncomeStatementReport {
            report_type: "income_statement".to_string(),
            period,
            income,
            expenses,
            net_income,
        }
    }

    /// Builds the general ledger of an account.
    ///
    /// `opening` is the balance before the period; `lines` the account's
    /// lines inside the period in date order.
    #[must_use]
    pub fn build_general_ledger(
        info: &AccountInfo,
        period: DateRange,
        opening: Decimal,
        lines: Vec<LedgerLine>,
    ) -> GeneralLedgerReport {
        let normal = info.category.normal_balance();
        let mut running = opening;
        let mut total_debit = Decimal::ZERO;
        let mut total_credit = Decimal::ZERO;

        let entries = lines
            .into_iter()
            .map(|line| {
                running += normal.net_change(line.debit, line.credit);
                total_debit += line.debit;
                total_credit += line.credit;
                GeneralLedgerEntry {
                    line_id: line.line_id,
                    journal_id: line.journal_id,
                    journal_date: line.journal_date,
                    reference: line.reference,
                    description: line.description,
                    debit: line.debit,
                    credit: line.credit,
                    running_balance: running,
                }
            })
            .collect();

        GeneralLedgerReport {
            report_type: "general_ledger".to_string(),
            account_id: info.id,
            code: info.code.clone(),
            name: info.name.clone(),
            period,
            opening_balance: opening,
            entries,
            total_debit,
            total_credit,
            closing_balance: running,
        }
    }

    fn add_to_section(section: &mut ReportSection, account: AccountBalance) {
        section.total += account.balance;
        section.accounts.push(account);
    }
}
