pub mod config;
pub mod decimal;
pub mod errors;
pub mod events;
pub mod fortnight;
pub mod interest;
pub mod passbook;
pub mod serialization;
pub mod transaction;
pub mod types;

// re-export key types
pub use config::{LedgerConfig, PrincipalRule, RateSchedule, RateStep, YearlyInterestMethod};
pub use decimal::{Money, Rate};
pub use errors::{AppendError, LedgerError, Result};
pub use events::{EventStore, LedgerEvent};
pub use fortnight::{AccrualPeriod, Fortnight};
pub use interest::FortnightInterest;
pub use passbook::{Ledger, Passbook, PassbookBuilder};
pub use serialization::{PassbookSnapshot, PassbookView};
pub use transaction::{Movement, Transaction, TransactionRecord};
pub use types::{PassbookId, TransactionId, TransactionKind};

// re-export external dependencies that users will need
pub use chrono;
pub use hourglass_rs::{SafeTimeProvider, TimeSource};
pub use rust_decimal::Decimal;
pub use uuid::Uuid;
