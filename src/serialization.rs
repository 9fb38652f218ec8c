/// serialization support for passbooks
use serde::{Deserialize, Serialize};

use crate::config::LedgerConfig;
use crate::decimal::Money;
use crate::errors::Result;
use crate::passbook::Passbook;
use crate::transaction::{Transaction, TransactionRecord};
use crate::types::PassbookId;

/// read-only view of a passbook for reporting
#[derive(Debug, Serialize)]
pub struct PassbookView<'a> {
    pub id: PassbookId,
    pub balance: Money,
    pub deposits_total: Money,
    pub withdrawals_total: Money,
    pub transaction_count: usize,
    pub transactions: &'a [Transaction],
}

impl<'a> PassbookView<'a> {
    pub fn from_passbook(passbook: &'a Passbook) -> Self {
        PassbookView {
            id: passbook.id(),
            balance: passbook.balance(),
            deposits_total: passbook.deposits_total(),
            withdrawals_total: passbook.withdrawals_total(),
            transaction_count: passbook.len(),
            transactions: passbook.transactions(),
        }
    }

    /// convert to pretty-printed json string
    pub fn to_json_pretty(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// persisted state of a passbook, replayed through the validated append path on restore
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PassbookSnapshot {
    pub id: PassbookId,
    pub config: LedgerConfig,
    pub transactions: Vec<TransactionRecord>,
}

impl PassbookSnapshot {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl Passbook {
    pub fn to_snapshot(&self) -> PassbookSnapshot {
        PassbookSnapshot {
            id: self.id(),
            config: self.config().clone(),
            transactions: self.iter().map(Transaction::to_record).collect(),
        }
    }

    /// rebuild a passbook, re-validating every transaction against its configuration
    pub fn from_snapshot(snapshot: PassbookSnapshot) -> Result<Self> {
        let mut passbook = Passbook::restore(snapshot.id, snapshot.config)?;
        let minimum = passbook.config().minimum_amount;

        for record in snapshot.transactions {
            passbook.add_transaction(record.into_transaction(minimum)?)?;
        }

        Ok(passbook)
    }

    /// get json representation of current state
    pub fn to_json_pretty(&self) -> String {
        PassbookView::from_passbook(self)
            .to_json_pretty()
            .unwrap_or_else(|e| format!("JSON error: {}", e))
    }

    /// short alias for json output
    pub fn json(&self) -> String {
        self.to_json_pretty()
    }
}
