//! Report data types.

use bursar_shared::types::{BranchId, DateRange};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::accounts::{AccountCategory, AccountInfo};
use crate::ledger::JournalKind;

/// A stored journal line joined with its header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerLine {
    /// Line ID.
    pub line_id: Uuid,
    /// Journal ID.
    pub journal_id: Uuid,
    /// Journal kind.
    pub kind: JournalKind,
    /// Journal reference.
    pub reference: String,
    /// Journal date.
    pub journal_date: NaiveDate,
    /// Position within the journal.
    pub line_no: i32,
    /// Top-level account.
    pub account_id: Uuid,
    /// Sub-account, if any.
    pub sub_account_id: Option<Uuid>,
    /// Debit amount.
    pub debit: Decimal,
    /// Credit amount.
    pub credit: Decimal,
    /// Line description, falling back to the journal's.
    pub description: String,
    /// Branch.
    pub branch_id: Option<BranchId>,
    /// Whether the line is reconciled against a bank statement.
    pub reconciled: bool,
    /// Reconciliation date.
    pub reconciled_at: Option<NaiveDate>,
}

/// Filter for listing journal lines.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LineFilter {
    /// Lines against this account or sub-account.
    pub account_id: Option<Uuid>,
    /// Lines of this journal.
    pub journal_id: Option<Uuid>,
    /// Lines of journals of this kind.
    pub kind: Option<JournalKind>,
    /// Journal date range.
    pub range: DateRange,
    /// Reconciled state.
    pub reconciled: Option<bool>,
    /// Branch.
    pub branch_id: Option<BranchId>,
}

/// Activity of one account (including its sub-accounts) over a range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountActivity {
    /// Account ID.
    pub account_id: Uuid,
    /// Account category.
    pub category: AccountCategory,
    /// Range covered.
    pub range: DateRange,
    /// Balance before the range (opening balances plus earlier activity).
    pub opening: Decimal,
    /// Debits inside the range.
    pub debit: Decimal,
    /// Credits inside the range.
    pub credit: Decimal,
    /// Balance at the end of the range.
    pub closing: Decimal,
}

/// Account balance for reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountBalance {
    /// Account ID.
    pub account_id: Uuid,
    /// Account code.
    pub code: String,
    /// Account name.
    pub name: String,
    /// Account category.
    pub category: AccountCategory,
    /// Parent account for sub-accounts.
    pub parent_id: Option<Uuid>,
    /// Opening balance on the normal side.
    pub opening_balance: Decimal,
    /// Total debit amount.
    pub total_debit: Decimal,
    /// Total credit amount.
    pub total_credit: Decimal,
    /// Net balance on the normal side.
    pub balance: Decimal,
}

impl AccountBalance {
    /// Builds a balance from an account's opening balance and activity.
    #[must_use]
    pub fn new(
        info: &AccountInfo,
        opening_balance: Decimal,
        total_debit: Decimal,
        total_credit: Decimal,
    ) -> Self {
        Self {
            account_id: info.id,
            code: info.code.clone(),
            name: info.name.clone(),
            category: info.category,
            parent_id: info.parent_id,
            opening_balance,
            total_debit,
            total_credit,
            balance: opening_balance
                + info
                    .category
                    .normal_balance()
                    .net_change(total_debit, total_credit),
        }
    }
}

/// Trial balance row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrialBalanceRow {
    /// The account's balance.
    pub account: AccountBalance,
    /// Balance shown in the debit column.
    pub debit_balance: Decimal,
    /// Balance shown in the credit column.
    pub credit_balance: Decimal,
}

/// Trial balance report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrialBalanceReport {
    /// Report type identifier.
    pub report_type: String,
    /// As of date.
    pub as_of: NaiveDate,
    /// Account rows in chart order.
    pub rows: Vec<TrialBalanceRow>,
    /// Totals.
    pub totals: TrialBalanceTotals,
}

/// Trial balance totals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrialBalanceTotals {
    /// Total of the debit column.
    pub total_debit: Decimal,
    /// Total of the credit column.
    pub total_credit: Decimal,
    /// Whether the columns agree within tolerance.
    pub is_balanced: bool,
}

/// Report section (assets, liabilities, income, ...).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportSection {
    /// Section total.
    pub total: Decimal,
    /// Accounts in this section.
    pub accounts: Vec<AccountBalance>,
}

/// Balance sheet report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceSheetReport {
    /// Report type identifier.
    pub report_type: String,
    /// As of date.
    pub as_of: NaiveDate,
    /// Assets section.
    pub assets: ReportSection,
    /// Liabilities section.
    pub liabilities: ReportSection,
    /// Equity section.
    pub equity: ReportSection,
    /// Income less expenses not yet closed to equity.
    pub current_earnings: Decimal,
    /// Total assets.
    pub total_assets: Decimal,
    /// Total liabilities.
    pub total_liabilities: Decimal,
    /// Total equity including current earnings.
    pub total_equity: Decimal,
    /// Liabilities plus equity.
    pub liabilities_and_equity: Decimal,
    /// Whether assets equal liabilities plus equity within tolerance.
    pub is_balanced: bool,
}

/// Income statement report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncomeStatementReport {
    /// Report type identifier.
    pub report_type: String,
    /// Period covered.
    pub period: DateRange,
    /// Income section.
    pub income: ReportSection,
    /// Expense section.
    pub expenses: ReportSection,
    /// Net income (income - expenses).
    pub net_income: Decimal,
}

/// General ledger entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralLedgerEntry {
    /// Line ID.
    pub line_id: Uuid,
    /// Journal ID.
    pub journal_id: Uuid,
    /// Journal date.
    pub journal_date: NaiveDate,
    /// Journal reference.
    pub reference: String,
    /// Description.
    pub description: String,
    /// Debit amount.
    pub debit: Decimal,
    /// Credit amount.
    pub credit: Decimal,
    /// Running balance on the normal side.
    pub running_balance: Decimal,
}

/// General ledger of one account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralLedgerReport {
    /// Report type identifier.
    pub report_type: String,
    /// Account ID.
    pub account_id: Uuid,
    /// Account code.
    pub code: String,
    /// Account name.
    pub name: String,
    /// Period covered.
    pub period: DateRange,
    /// Balance before the period.
    pub opening_balance: Decimal,
    /// Entries in date order.
    pub entries: Vec<GeneralLedgerEntry>,
    /// Debits in the period.
    pub total_debit: Decimal,
    /// Credits in the period.
    pub total_credit: Decimal,
    /// Balance at the end of the period.
    pub closing_balance: Decimal,
}
