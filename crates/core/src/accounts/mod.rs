//! Chart of accounts rules.
//!
//! Two-level account tree (account → sub-account), role tags used by the
//! originators to find the accounts they post to, and the validation rules
//! applied when an account is registered.

pub mod chart;
pub mod rules;
pub mod types;

pub use chart::{ChartEntry, default_chart};
pub use rules::{NewAccount, validate_new_account};
pub use types::{AccountCategory, AccountInfo, AccountRole, NormalBalance, PostingTarget};
