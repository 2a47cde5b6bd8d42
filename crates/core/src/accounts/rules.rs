//! Validation rules for registering accounts.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::types::{AccountCategory, AccountInfo, AccountRole};
use crate::ledger::LedgerError;

/// Maximum length of an account code.
pub const MAX_CODE_LEN: usize = 32;

/// Input for registering a new account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAccount {
    /// Unique account code.
    pub code: String,
    /// Display name.
    pub name: String,
    /// Account category. Sub-accounts must match their parent.
    pub category: AccountCategory,
    /// Optional role tag.
    pub role: Option<AccountRole>,
    /// Parent account, making this a sub-account.
    pub parent_id: Option<Uuid>,
    /// Balance carried in from before the ledger started, on the normal side.
    pub opening_balance: Decimal,
    /// Presentation order within the chart.
    pub sort_order: i32,
}

/// Validates a new account against its parent (if any).
///
/// Uniqueness of the code and of the role among active accounts needs the
/// store and is checked by the repository.
///
/// # Errors
///
/// Returns `LedgerError::Validation` when the code or name is blank, the
/// role does not fit the category, or the parent is inactive, itself a
/// sub-account, or of a different category.
pub fn validate_new_account(
    input: &NewAccount,
    parent: Option<&AccountInfo>,
) -> Result<(), LedgerError> {
    let code = input.code.trim();
    if code.is_empty() {
        return Err(LedgerError::Validation("account code is required".to_string()));
    }
    if code.len() > MAX_CODE_LEN {
        return Err(LedgerError::Validation(format!(
            "account code must be at most {MAX_CODE_LEN} characters"
        )));
    }
    if input.name.trim().is_empty() {
        return Err(LedgerError::Validation("account name is required".to_string()));
    }

    if let Some(role) = input.role
        && role.expected_category() != input.category
    {
        return Err(LedgerError::Validation(format!(
            "role '{role}' requires a {} account, got {}",
            role.expected_category(),
            input.category
        )));
    }

    match (input.parent_id, parent) {
        (None, _) => Ok(()),
        (Some(parent_id), None) => Err(LedgerError::AccountNotFound(parent_id)),
        (Some(_), Some(parent)) => {
            if !parent.is_active {
                return Err(LedgerError::Validation(format!(
                    "parent account {} is inactive",
                    parent.code
                )));
            }
            if !parent.is_top_level() {
                return Err(LedgerError::Validation(format!(
                    "parent account {} is itself a sub-account",
                    parent.code
                )));
            }
            if parent.category != input.category {
                return Err(LedgerError::Validation(format!(
                    "sub-account category {} does not match parent category {}",
                    input.category, parent.category
                )));
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn new_account(category: AccountCategory, role: Option<AccountRole>) -> NewAccount {
        NewAccount {
            code: "1001".to_string(),
            name: "Petty Cash".to_string(),
            category,
            role,
            parent_id: None,
            opening_balance: dec!(0),
            sort_order: 0,
        }
    }

    fn parent(category: AccountCategory) -> AccountInfo {
        AccountInfo {
            id: Uuid::new_v4(),
            code: "1000".to_string(),
            name: "Cash".to_string(),
            category,
            role: None,
            parent_id: None,
            is_active: true,
        }
    }

    #[test]
    fn test_valid_top_level_account() {
        let input = new_account(AccountCategory::Asset, Some(AccountRole::Cash));
        assert!(validate_new_account(&input, None).is_ok());
    }

    #[test]
    fn test_blank_code_rejected() {
        let mut input = new_account(AccountCategory::Asset, None);
        input.code = "   ".to_string();
        assert!(matches!(
            validate_new_account(&input, None),
            Err(LedgerError::Validation(_))
        ));
    }

    #[test]
    fn test_role_category_mismatch_rejected() {
        let input = new_account(AccountCategory::Expense, Some(AccountRole::Receivable));
        assert!(matches!(
            validate_new_account(&input, None),
            Err(LedgerError::Validation(_))
        ));
    }

    #[test]
    fn test_sub_account_of_inactive_parent_rejected() {
        let mut parent = parent(AccountCategory::Asset);
        parent.is_active = false;
        let mut input = new_account(AccountCategory::Asset, None);
        input.parent_id = Some(parent.id);

        assert!(matches!(
            validate_new_account(&input, Some(&parent)),
            Err(LedgerError::Validation(_))
        ));
    }

    #[test]
    fn test_third_level_rejected() {
        let mut parent = parent(AccountCategory::Asset);
        parent.parent_id = Some(Uuid::new_v4());
        let mut input = new_account(AccountCategory::Asset, None);
        input.parent_id = Some(parent.id);

        assert!(validate_new_account(&input, Some(&parent)).is_err());
    }

    #[test]
    fn test_sub_account_category_must_match() {
        let parent = parent(AccountCategory::Asset);
        let mut input = new_account(AccountCategory::Income, None);
        input.parent_id = Some(parent.id);

        assert!(validate_new_account(&input, Some(&parent)).is_err());

        input.category = AccountCategory::Asset;
        assert!(validate_new_account(&input, Some(&parent)).is_ok());
    }

    #[test]
    fn test_missing_parent_reported() {
        let mut input = new_account(AccountCategory::Asset, None);
        let parent_id = Uuid::new_v4();
        input.parent_id = Some(parent_id);

        assert!(matches!(
            validate_new_account(&input, None),
            Err(LedgerError::AccountNotFound(id)) if id == parent_id
        ));
    }
}
