use thiserror::Error;

use super::account::AccountType;

/// Failures raised while building or rendering QIF records.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QifError {
    #[error("Sum of splits ({actual}) is not equal resulting amount ({expected})")]
    SplitMismatch { expected: i64, actual: i64 },

    #[error("Transaction for '{found}' account cannot be added to '{expected}' account")]
    AccountMismatch {
        expected: AccountType,
        found: AccountType,
    },

    #[error("Invalid amount '{value}': {reason}")]
    InvalidAmount { value: String, reason: String },

    #[error("Amount total overflows: {left} + {right}")]
    AmountOverflow { left: i64, right: i64 },

    #[error("Unknown account type '{0}'")]
    UnknownAccountType(String),
}
