use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use hourglass_rs::SafeTimeProvider;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::MINIMUM_AMOUNT;
use crate::decimal::Money;
use crate::errors::{LedgerError, Result};
use crate::types::{TransactionId, TransactionKind};

/// anything the passbook can record as a movement of money
pub trait Movement {
    fn amount(&self) -> Money;

    fn created_on(&self) -> DateTime<Utc>;

    /// deposit for positive amounts, withdraw otherwise
    ///
    /// validated movements are never zero.
    fn kind(&self) -> TransactionKind {
        if self.amount().is_positive() {
            TransactionKind::Deposit
        } else {
            TransactionKind::Withdraw
        }
    }
}

/// an immutable, validated deposit or withdrawal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "TransactionRecord")]
pub struct Transaction {
    id: TransactionId,
    amount: Money,
    created_on: DateTime<Utc>,
}

impl Transaction {
    /// create a transaction, rejecting amounts within ±10 (bounds included)
    pub fn new(amount: Money, created_on: DateTime<Utc>) -> Result<Self> {
        Self::with_minimum(amount, created_on, Money::from_major(MINIMUM_AMOUNT))
    }

    /// create a transaction whose magnitude must exceed `minimum`
    ///
    /// `minimum` can only raise the floor; amounts within ±10 are always rejected.
    pub fn with_minimum(amount: Money, created_on: DateTime<Utc>, minimum: Money) -> Result<Self> {
        let minimum = minimum.max(Money::from_major(MINIMUM_AMOUNT));
        if amount.abs() <= minimum {
            return Err(LedgerError::InvalidAmount { amount, minimum });
        }

        Ok(Self {
            id: Uuid::new_v4(),
            amount,
            created_on,
        })
    }

    /// create a transaction from a `YYYY-MM-DD` or `YYYY-MM-DD HH:MM:SS` string
    pub fn parse(amount: Money, created_on: &str) -> Result<Self> {
        Self::new(amount, parse_instant(created_on)?)
    }

    /// create a transaction stamped with the provider's current time
    pub fn stamped(amount: Money, time_provider: &SafeTimeProvider) -> Result<Self> {
        Self::new(amount, time_provider.now())
    }

    pub fn id(&self) -> TransactionId {
        self.id
    }

    pub fn amount(&self) -> Money {
        self.amount
    }

    pub fn created_on(&self) -> DateTime<Utc> {
        self.created_on
    }

    pub fn kind(&self) -> TransactionKind {
        Movement::kind(self)
    }

    pub fn is_deposit(&self) -> bool {
        self.kind() == TransactionKind::Deposit
    }

    pub fn is_withdrawal(&self) -> bool {
        self.kind() == TransactionKind::Withdraw
    }

    pub(crate) fn to_record(&self) -> TransactionRecord {
        TransactionRecord {
            id: Some(self.id),
            amount: self.amount,
            created_on: self.created_on,
        }
    }
}

impl Movement for Transaction {
    fn amount(&self) -> Money {
        self.amount
    }

    fn created_on(&self) -> DateTime<Utc> {
        self.created_on
    }
}

/// unvalidated wire form of a transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<TransactionId>,
    pub amount: Money,
    pub created_on: DateTime<Utc>,
}

impl TransactionRecord {
    /// validate against `minimum`, keeping the recorded id when present
    pub fn into_transaction(self, minimum: Money) -> Result<Transaction> {
        let mut transaction = Transaction::with_minimum(self.amount, self.created_on, minimum)?;
        if let Some(id) = self.id {
            transaction.id = id;
        }
        Ok(transaction)
    }
}

impl TryFrom<TransactionRecord> for Transaction {
    type Error = LedgerError;

    fn try_from(record: TransactionRecord) -> Result<Self> {
        record.into_transaction(Money::from_major(MINIMUM_AMOUNT))
    }
}

/// parse a `YYYY-MM-DD` (midnight) or `YYYY-MM-DD HH:MM:SS` string as a utc instant
pub fn parse_instant(value: &str) -> Result<DateTime<Utc>> {
    let value = value.trim();

    if let Ok(dt) = NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S") {
        return Ok(dt.and_utc());
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
        .ok_or_else(|| LedgerError::InvalidDate {
            message: format!("expected YYYY-MM-DD or YYYY-MM-DD HH:MM:SS, got '{}'", value),
        })
}
