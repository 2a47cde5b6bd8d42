//! Account domain types.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ledger::LedgerError;

/// Top-level classification of an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountCategory {
    /// Resources owned (cash, bank, receivables, stock).
    Asset,
    /// Obligations owed (payables, deposits held).
    Liability,
    /// Owner's equity.
    Equity,
    /// Revenue.
    Income,
    /// Costs.
    Expense,
}

/// Side on which an account's balance normally sits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NormalBalance {
    /// Debits increase the balance.
    Debit,
    /// Credits increase the balance.
    Credit,
}

impl NormalBalance {
    /// Net change of a balance for the given debit and credit activity.
    #[must_use]
    pub fn net_change(self, debit: Decimal, credit: Decimal) -> Decimal {
        match self {
            Self::Debit => debit - credit,
            Self::Credit => credit - debit,
        }
    }
}

impl AccountCategory {
    /// All categories in chart order.
    pub const ALL: [Self; 5] = [
        Self::Asset,
        Self::Liability,
        Self::Equity,
        Self::Income,
        Self::Expense,
    ];

    /// Returns the side on which this category's balance normally sits.
    #[must_use]
    pub const fn normal_balance(self) -> NormalBalance {
        match self {
            Self::Asset | Self::Expense => NormalBalance::Debit,
            Self::Liability | Self::Equity | Self::Income => NormalBalance::Credit,
        }
    }

    /// Returns true for categories reported on the balance sheet.
    #[must_use]
    pub const fn is_balance_sheet(self) -> bool {
        matches!(self, Self::Asset | Self::Liability | Self::Equity)
    }

    /// Returns the storage name of the category.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asset => "asset",
            Self::Liability => "liability",
            Self::Equity => "equity",
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }
}

impl fmt::Display for AccountCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccountCategory {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| LedgerError::Validation(format!("unknown account category '{s}'")))
    }
}

/// Functional tag that lets originators find an account without matching
/// on its name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountRole {
    /// Cash on hand; settles cash payments.
    Cash,
    /// Main bank account; settles every non-cash payment.
    Bank,
    /// Accounts receivable.
    Receivable,
    /// Accounts payable.
    Payable,
    /// Fallback income account for invoice lines.
    RevenueDefault,
}

impl AccountRole {
    /// Roles every installation must have an active account for.
    pub const REQUIRED: [Self; 5] = [
        Self::Cash,
        Self::Bank,
        Self::Receivable,
        Self::Payable,
        Self::RevenueDefault,
    ];

    /// Returns the storage name of the role.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cash => "cash",
            Self::Bank => "bank",
            Self::Receivable => "receivable",
            Self::Payable => "payable",
            Self::RevenueDefault => "revenue_default",
        }
    }

    /// Category an account must belong to in order to carry this role.
    #[must_use]
    pub const fn expected_category(self) -> AccountCategory {
        match self {
            Self::Cash | Self::Bank | Self::Receivable => AccountCategory::Asset,
            Self::Payable => AccountCategory::Liability,
            Self::RevenueDefault => AccountCategory::Income,
        }
    }
}

impl fmt::Display for AccountRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccountRole {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::REQUIRED
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| LedgerError::Validation(format!("unknown account role '{s}'")))
    }
}

/// Account information needed for posting and validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountInfo {
    /// The account ID.
    pub id: Uuid,
    /// Unique account code (e.g. "1001").
    pub code: String,
    /// Display name.
    pub name: String,
    /// Account category.
    pub category: AccountCategory,
    /// Optional role tag.
    pub role: Option<AccountRole>,
    /// Parent account for sub-accounts.
    pub parent_id: Option<Uuid>,
    /// Whether the account accepts new postings.
    pub is_active: bool,
}

impl AccountInfo {
    /// Returns true if this account sits at the top of the tree.
    #[must_use]
    pub const fn is_top_level(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Returns where a line against this account is stored.
    ///
    /// Lines always carry the top-level account; a sub-account is recorded
    /// alongside its parent.
    #[must_use]
    pub fn posting_target(&self) -> PostingTarget {
        match self.parent_id {
            Some(parent_id) => PostingTarget {
                account_id: parent_id,
                sub_account_id: Some(self.id),
            },
            None => PostingTarget::account(self.id),
        }
    }
}

/// Account (and optional sub-account) a journal line is posted against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PostingTarget {
    /// Top-level account.
    pub account_id: Uuid,
    /// Sub-account of `account_id`, if any.
    pub sub_account_id: Option<Uuid>,
}

impl PostingTarget {
    /// Target a top-level account directly.
    #[must_use]
    pub const fn account(account_id: Uuid) -> Self {
        Self {
            account_id,
            sub_account_id: None,
        }
    }

    /// Target a sub-account of `account_id`.
    #[must_use]
    pub const fn sub_account(account_id: Uuid, sub_account_id: Uuid) -> Self {
        Self {
            account_id,
            sub_account_id: Some(sub_account_id),
        }
    }

    /// The most specific account of the target.
    #[must_use]
    pub fn leaf(&self) -> Uuid {
        self.sub_account_id.unwrap_or(self.account_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    #[rstest]
    #[case(AccountCategory::Asset, NormalBalance::Debit)]
    #[case(AccountCategory::Expense, NormalBalance::Debit)]
    #[case(AccountCategory::Liability, NormalBalance::Credit)]
    #[case(AccountCategory::Equity, NormalBalance::Credit)]
    #[case(AccountCategory::Income, NormalBalance::Credit)]
    fn test_normal_balance(#[case] category: AccountCategory, #[case] expected: NormalBalance) {
        assert_eq!(category.normal_balance(), expected);
    }

    #[test]
    fn test_net_change() {
        assert_eq!(NormalBalance::Debit.net_change(dec!(100), dec!(30)), dec!(70));
        assert_eq!(NormalBalance::Credit.net_change(dec!(100), dec!(30)), dec!(-70));
    }

    #[test]
    fn test_role_roundtrip() {
        for role in AccountRole::REQUIRED {
            assert_eq!(role.as_str().parse::<AccountRole>().unwrap(), role);
        }
        assert!("petty_cash".parse::<AccountRole>().is_err());
    }

    #[test]
    fn test_category_roundtrip() {
        for category in AccountCategory::ALL {
            assert_eq!(category.to_string().parse::<AccountCategory>().unwrap(), category);
        }
    }

    #[test]
    fn test_role_expected_category() {
        assert_eq!(AccountRole::Cash.expected_category(), AccountCategory::Asset);
        assert_eq!(AccountRole::Payable.expected_category(), AccountCategory::Liability);
        assert_eq!(
            AccountRole::RevenueDefault.expected_category(),
            AccountCategory::Income
        );
    }

    #[test]
    fn test_posting_target_for_sub_account() {
        let parent = Uuid::new_v4();
        let info = AccountInfo {
            id: Uuid::new_v4(),
            code: "4001-01".to_string(),
            name: "Tuition - Grade 1".to_string(),
            category: AccountCategory::Income,
            role: None,
            parent_id: Some(parent),
            is_active: true,
        };

        let target = info.posting_target();
        assert_eq!(target.account_id, parent);
        assert_eq!(target.sub_account_id, Some(info.id));
        assert_eq!(target.leaf(), info.id);
    }

    #[test]
    fn test_posting_target_for_top_level() {
        let id = Uuid::new_v4();
        let target = PostingTarget::account(id);
        assert_eq!(target.leaf(), id);
        assert!(target.sub_account_id.is_none());
    }
}
