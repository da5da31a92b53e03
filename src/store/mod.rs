//! Persistence layer
//!
//! Every store is a thin handle over the shared connection in [`crate::db`].
//! Writes that must be atomic are single conditional statements or immediate
//! transactions; nothing here caches domain state between calls.

pub mod accounts;
pub mod campaigns;
pub mod ledger;
pub mod platform;

pub use accounts::AccountStore;
pub use campaigns::{CampaignStore, DeliveryCandidate};
pub use ledger::{LedgerStore, RecordOutcome};
pub use platform::{AdvanceDay, PlatformStore};

use uuid::Uuid;

/// Parse a TEXT id column, mapping bad data to a rusqlite error.
pub(crate) fn uuid_column(idx: usize, value: &str) -> rusqlite::Result<Uuid> {
    Uuid::parse_str(value).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}
