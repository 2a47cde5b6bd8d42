//! Deposits into asset accounts.

use bursar_shared::types::BranchId;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::accounts::{AccountCategory, AccountInfo, PostingTarget};
use crate::ledger::{JournalLineInput, LedgerError};

/// Request to record a deposit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepositInput {
    /// Asset account receiving the money.
    pub deposit_account_id: Uuid,
    /// Optional sub-account of the deposit account.
    pub deposit_sub_account_id: Option<Uuid>,
    /// Income, liability or equity account the money comes from.
    pub source_account_id: Uuid,
    /// Optional sub-account of the source account.
    pub source_sub_account_id: Option<Uuid>,
    /// Amount deposited.
    pub amount: Decimal,
    /// Deposit date; also the journal date.
    pub deposit_date: NaiveDate,
    /// Description.
    pub description: String,
}

/// Builds the lines of a deposit: debit the asset, credit the source.
///
/// # Errors
///
/// Returns `LedgerError::Validation` when no branch is given, the amount is
/// not positive, the deposit account is not an asset, or the source is not
/// an income, liability or equity account.
pub fn build_deposit_lines(
    input: &DepositInput,
    deposit_account: &AccountInfo,
    source_account: &AccountInfo,
    branch_id: Option<BranchId>,
) -> Result<Vec<JournalLineInput>, LedgerError> {
    let Some(branch_id) = branch_id else {
        return Err(LedgerError::Validation(
            "a branch is required to record a deposit".to_string(),
        ));
    };
    if input.amount <= Decimal::ZERO {
        return Err(LedgerError::Validation(
            "deposit amount must be positive".to_string(),
        ));
    }
    if deposit_account.category != AccountCategory::Asset {
        return Err(LedgerError::Validation(format!(
            "deposit account {} must be an asset account",
            deposit_account.code
        )));
    }
    if !matches!(
        source_account.category,
        AccountCategory::Income | AccountCategory::Liability | AccountCategory::Equity
    ) {
        return Err(LedgerError::Validation(format!(
            "source account {} must be an income, liability or equity account",
            source_account.code
        )));
    }

    let deposit = PostingTarget {
        account_id: deposit_account.id,
        sub_account_id: input.deposit_sub_account_id,
    };
    let source = PostingTarget {
        account_id: source_account.id,
        sub_account_id: input.source_sub_account_id,
    };

    Ok(vec![
        JournalLineInput::debit(deposit, input.amount)
            .with_description(input.description.as_str())
            .with_branch(Some(branch_id)),
        JournalLineInput::credit(source, input.amount)
            .with_description(input.description.as_str())
            .with_branch(Some(branch_id)),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn account(category: AccountCategory) -> AccountInfo {
        AccountInfo {
            id: Uuid::new_v4(),
            code: "1010".to_string(),
            name: "Bank".to_string(),
            category,
            role: None,
            parent_id: None,
            is_active: true,
        }
    }

    fn input(deposit: &AccountInfo, source: &AccountInfo, amount: Decimal) -> DepositInput {
        DepositInput {
            deposit_account_id: deposit.id,
            deposit_sub_account_id: None,
            source_account_id: source.id,
            source_sub_account_id: None,
            amount,
            deposit_date: NaiveDate::from_ymd_opt(2026, 3, 2).unwrap(),
            description: "Canteen takings".to_string(),
        }
    }

    #[test]
    fn test_deposit_lines_stamped_with_branch() {
        let bank = account(AccountCategory::Asset);
        let income = account(AccountCategory::Income);
        let branch = BranchId::new();

        let lines =
            build_deposit_lines(&input(&bank, &income, dec!(250)), &bank, &income, Some(branch))
                .unwrap();

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].account_id, bank.id);
        assert_eq!(lines[0].debit, dec!(250));
        assert_eq!(lines[1].account_id, income.id);
        assert!(lines.iter().all(|l| l.branch_id == Some(branch)));
    }

    #[test]
    fn test_branch_required() {
        let bank = account(AccountCategory::Asset);
        let income = account(AccountCategory::Income);
        assert!(matches!(
            build_deposit_lines(&input(&bank, &income, dec!(1)), &bank, &income, None),
            Err(LedgerError::Validation(_))
        ));
    }

    #[test]
    fn test_category_rules() {
        let bank = account(AccountCategory::Asset);
        let expense = account(AccountCategory::Expense);
        let branch = Some(BranchId::new());

        assert!(
            build_deposit_lines(&input(&bank, &expense, dec!(1)), &bank, &expense, branch)
                .is_err()
        );
        assert!(
            build_deposit_lines(&input(&expense, &bank, dec!(1)), &expense, &bank, branch)
                .is_err()
        );
    }
}
