//! Data transfer objects, configuration primitives, and the shared error type
//! for the harvest minute-candle pipeline.
#![warn(missing_docs)]

mod candle;
mod config;
mod error;
mod instrument;
mod raw;
mod reports;

pub use candle::{Candle, Session};
pub use config::{ExpectedCounts, HarvestConfig, HarvestMode, PersistConfig, RetryConfig};
pub use error::HarvestError;
pub use instrument::{InstrumentRule, Inventory, Strategy};
pub use raw::{BrokerRow, PrimaryRow, RawTimestamp};
pub use reports::{CommitSummary, HarvestOutcome, HarvestResult, Provenance, Status};
