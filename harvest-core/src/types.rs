//! Re-export of foundational types from `harvest-types`.
// Consolidated re-exports so downstream crates can depend on `harvest-core` only

pub use harvest_types::{BrokerRow, PrimaryRow, RawTimestamp};
pub use harvest_types::{Candle, Session};
pub use harvest_types::{
    CommitSummary, HarvestOutcome, HarvestResult, Provenance, Status,
};
pub use harvest_types::{
    ExpectedCounts, HarvestConfig, HarvestMode, PersistConfig, RetryConfig,
};
pub use harvest_types::{HarvestError, InstrumentRule, Inventory, Strategy};

pub use chrono_tz::Tz;
pub use rust_decimal::Decimal;
