use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::types::{PassbookId, TransactionId, TransactionKind};

/// all events a passbook can emit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LedgerEvent {
    PassbookOpened {
        passbook_id: PassbookId,
    },
    TransactionRecorded {
        passbook_id: PassbookId,
        transaction_id: TransactionId,
        kind: TransactionKind,
        amount: Money,
        balance_after: Money,
        created_on: DateTime<Utc>,
    },
}

/// event store for collecting events during operations
#[derive(Debug, Clone, Default)]
pub struct EventStore {
    events: Vec<LedgerEvent>,
}

impl EventStore {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn emit(&mut self, event: LedgerEvent) {
        self.events.push(event);
    }

    pub fn take_events(&mut self) -> Vec<LedgerEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn events(&self) -> &[LedgerEvent] {
        &self.events
    }
}
