use chrono::{DateTime, NaiveDate, Utc};
use thiserror::Error;

use crate::decimal::Money;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LedgerError {
    #[error("invalid transaction amount {amount}: deposit or withdrawal must be above {minimum}")]
    InvalidAmount {
        amount: Money,
        minimum: Money,
    },

    /// a withdrawal larger than the balance. this is an invalid amount too:
    /// match with [`LedgerError::is_invalid_amount`] to catch both kinds.
    #[error("the passbook cannot have a negative balance: balance {balance}, withdrawal {amount}")]
    NegativeBalance {
        balance: Money,
        amount: Money,
    },

    #[error("transactions must be added in chronological order: {created_on} is before {last}")]
    InvalidTransactionDate {
        created_on: DateTime<Utc>,
        last: DateTime<Utc>,
    },

    #[error("invalid start date for a fortnight: {date} is neither the 1st nor the 16th")]
    InvalidFortnight {
        date: NaiveDate,
    },

    #[error("invalid date: {message}")]
    InvalidDate {
        message: String,
    },

    #[error("invalid configuration: {message}")]
    InvalidConfiguration {
        message: String,
    },

    #[error("serialization error: {message}")]
    Serialization {
        message: String,
    },
}

impl LedgerError {
    /// both amount rejections (too small, or overdrawing the passbook)
    pub fn is_invalid_amount(&self) -> bool {
        matches!(
            self,
            LedgerError::InvalidAmount { .. } | LedgerError::NegativeBalance { .. }
        )
    }
}

impl From<serde_json::Error> for LedgerError {
    fn from(err: serde_json::Error) -> Self {
        LedgerError::Serialization {
            message: err.to_string(),
        }
    }
}

/// batch append stopped part-way
///
/// the first `accepted` transactions of the batch stay in the passbook.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("batch append stopped after {accepted} accepted transaction(s): {error}")]
pub struct AppendError {
    pub accepted: usize,
    #[source]
    pub error: LedgerError,
}

pub type Result<T> = std::result::Result<T, LedgerError>;
