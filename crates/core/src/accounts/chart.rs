//! Default chart of accounts used when seeding a new installation.

use super::types::{AccountCategory, AccountRole};

/// One account of a seed chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChartEntry {
    /// Account code.
    pub code: &'static str,
    /// Display name.
    pub name: &'static str,
    /// Account category.
    pub category: AccountCategory,
    /// Optional role tag.
    pub role: Option<AccountRole>,
    /// Code of the parent account for sub-accounts.
    pub parent_code: Option<&'static str>,
}

const fn top(
    code: &'static str,
    name: &'static str,
    category: AccountCategory,
    role: Option<AccountRole>,
) -> ChartEntry {
    ChartEntry {
        code,
        name,
        category,
        role,
        parent_code: None,
    }
}

const fn sub(
    code: &'static str,
    name: &'static str,
    category: AccountCategory,
    parent_code: &'static str,
) -> ChartEntry {
    ChartEntry {
        code,
        name,
        category,
        role: None,
        parent_code: Some(parent_code),
    }
}

/// Returns the default chart, parents before their sub-accounts.
///
/// Every role in [`AccountRole::REQUIRED`] is carried by exactly one entry.
#[must_use]
pub fn default_chart() -> Vec<ChartEntry> {
    use AccountCategory::{Asset, Equity, Expense, Income, Liability};

    vec![
        top("1000", "Cash on Hand", Asset, Some(AccountRole::Cash)),
        top("1010", "Bank", Asset, Some(AccountRole::Bank)),
        top("1100", "Accounts Receivable", Asset, Some(AccountRole::Receivable)),
        top("1200", "Inventory", Asset, None),
        top("2000", "Accounts Payable", Liability, Some(AccountRole::Payable)),
        top("2100", "Customer Deposits", Liability, None),
        top("3000", "Owner's Equity", Equity, None),
        top("4000", "Tuition Fees", Income, Some(AccountRole::RevenueDefault)),
        top("4100", "Sales", Income, None),
        sub("4100-01", "Uniform Sales", Income, "4100"),
        sub("4100-02", "Book Sales", Income, "4100"),
        top("4200", "Other Income", Income, None),
        top("5000", "Cost of Goods Sold", Expense, None),
        top("5100", "Salaries", Expense, None),
        top("5200", "Utilities", Expense, None),
        top("5300", "Supplies", Expense, None),
    ]
}
