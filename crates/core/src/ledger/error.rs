//! Ledger error types for posting, settlement and stock operations.
//!
//! Every rejection the core can produce is a variant here, with a stable
//! error code, an HTTP status hint and a retryability flag for the callers
//! above the repositories.

use bursar_shared::AppError;
use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

use crate::accounts::AccountRole;

/// Errors that can occur during ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    // ========== Validation Errors ==========
    /// Input failed a business validation rule.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A journal must have at least 2 lines.
    #[error("Journal must have at least 2 lines")]
    InsufficientLines,

    /// A line must carry exactly one positive side.
    #[error("Line {line}: {reason}")]
    InvalidLine {
        /// 1-based position of the offending line in the input.
        line: usize,
        /// What is wrong with the line.
        reason: &'static str,
    },

    /// Debits and credits differ by more than the tolerance.
    #[error("Journal is not balanced. Debit: {debit}, Credit: {credit}")]
    UnbalancedJournal {
        /// Total debits.
        debit: Decimal,
        /// Total credits.
        credit: Decimal,
    },

    /// Payment would take the paid amount past the total.
    #[error("Payment of {amount} exceeds the remaining balance of {remaining}")]
    Overpayment {
        /// Requested amount.
        amount: Decimal,
        /// Outstanding balance.
        remaining: Decimal,
    },

    /// Amount is zero, negative or otherwise not payable.
    #[error("Invalid amount {amount} (remaining balance {remaining})")]
    InvalidAmount {
        /// Requested amount.
        amount: Decimal,
        /// Outstanding balance.
        remaining: Decimal,
    },

    // ========== Account Errors ==========
    /// No active account carries a required role.
    #[error("No active account carries the '{role}' role")]
    MissingAccount {
        /// The missing role.
        role: AccountRole,
    },

    /// Account not found.
    #[error("Account not found: {0}")]
    AccountNotFound(Uuid),

    /// No account has this code.
    #[error("Account code not found: {0}")]
    AccountCodeNotFound(String),

    /// Account is inactive and cannot be posted to.
    #[error("Account {0} is inactive")]
    AccountInactive(Uuid),

    /// Line account is a sub-account; lines carry the top-level account.
    #[error("Account {0} is a sub-account and cannot be the line account")]
    NotTopLevel(Uuid),

    /// Sub-account does not belong to the line's account.
    #[error("Sub-account {sub_account_id} does not belong to account {account_id}")]
    SubAccountMismatch {
        /// The line account.
        account_id: Uuid,
        /// The sub-account given on the line.
        sub_account_id: Uuid,
    },

    /// Account code already in use.
    #[error("Account code already exists: {0}")]
    DuplicateCode(String),

    // ========== Journal Errors ==========
    /// Journal reference already used for this kind.
    #[error("Reference {reference} already exists for {kind} journals")]
    DuplicateReference {
        /// Journal kind.
        kind: String,
        /// The clashing reference.
        reference: String,
    },

    /// Journal has already been reversed or payment already voided.
    #[error("{entity} {id} has already been reversed")]
    AlreadyReversed {
        /// Entity kind.
        entity: &'static str,
        /// Entity ID.
        id: Uuid,
    },

    /// A rule guarding existing data refused the change.
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    /// Referenced record does not exist.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Entity kind.
        entity: &'static str,
        /// Entity ID.
        id: Uuid,
    },

    // ========== Concurrency Errors ==========
    /// Another writer changed the row or claimed the key first.
    #[error("Concurrent modification of {entity} {key}, please retry")]
    ConcurrentModification {
        /// Entity kind.
        entity: &'static str,
        /// Row ID or unique key that was contended.
        key: String,
    },

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl LedgerError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::InsufficientLines => "INSUFFICIENT_LINES",
            Self::InvalidLine { .. } => "INVALID_LINE",
            Self::UnbalancedJournal { .. } => "UNBALANCED_JOURNAL",
            Self::Overpayment { .. } => "OVERPAYMENT",
            Self::InvalidAmount { .. } => "INVALID_AMOUNT",
            Self::MissingAccount { .. } => "MISSING_ACCOUNT",
            Self::AccountNotFound(_) | Self::AccountCodeNotFound(_) => "ACCOUNT_NOT_FOUND",
            Self::AccountInactive(_) => "ACCOUNT_INACTIVE",
            Self::NotTopLevel(_) => "ACCOUNT_NOT_TOP_LEVEL",
            Self::SubAccountMismatch { .. } => "SUB_ACCOUNT_MISMATCH",
            Self::DuplicateCode(_) => "DUPLICATE_CODE",
            Self::DuplicateReference { .. } => "DUPLICATE_REFERENCE",
            Self::AlreadyReversed { .. } => "ALREADY_REVERSED",
            Self::ConstraintViolation(_) => "CONSTRAINT_VIOLATION",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::ConcurrentModification { .. } => "CONCURRENT_MODIFICATION",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            // 400 Bad Request - validation errors
            Self::Validation(_)
            | Self::InsufficientLines
            | Self::InvalidLine { .. }
            | Self::UnbalancedJournal { .. }
            | Self::InvalidAmount { .. }
            | Self::AccountInactive(_)
            | Self::NotTopLevel(_)
            | Self::SubAccountMismatch { .. } => 400,

            // 404 Not Found
            Self::AccountNotFound(_) | Self::AccountCodeNotFound(_) | Self::NotFound { .. } => 404,

            // 409 Conflict
            Self::DuplicateCode(_)
            | Self::DuplicateReference { .. }
            | Self::AlreadyReversed { .. }
            | Self::ConcurrentModification { .. } => 409,

            // 422 Unprocessable - business rules over existing state
            Self::Overpayment { .. } | Self::ConstraintViolation(_) => 422,

            // 500 Internal Server Error - setup problems included
            Self::MissingAccount { .. } | Self::Internal(_) => 500,
        }
    }

    /// Returns true if this error is retryable.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::ConcurrentModification { .. })
    }
}

impl From<LedgerError> for AppError {
    fn from(err: LedgerError) -> Self {
        let message = err.to_string();
        match err {
            LedgerError::AccountNotFound(_)
            | LedgerError::AccountCodeNotFound(_)
            | LedgerError::NotFound { .. } => Self::NotFound(message),
            LedgerError::Validation(_)
            | LedgerError::InsufficientLines
            | LedgerError::InvalidLine { .. }
            | LedgerError::UnbalancedJournal { .. }
            | LedgerError::InvalidAmount { .. }
            | LedgerError::AccountInactive(_)
            | LedgerError::NotTopLevel(_)
            | LedgerError::SubAccountMismatch { .. } => Self::Validation(message),
            LedgerError::Overpayment { .. } | LedgerError::ConstraintViolation(_) => {
                Self::BusinessRule(message)
            }
            LedgerError::DuplicateCode(_)
            | LedgerError::DuplicateReference { .. }
            | LedgerError::AlreadyReversed { .. } => Self::Conflict(message),
            LedgerError::ConcurrentModification { .. } => Self::Retryable(message),
            LedgerError::MissingAccount { .. } | LedgerError::Internal(_) => {
                Self::Internal(message)
            }
        }
    }
}
