//! Harvest orchestrates minute-candle collection across a free primary provider
//! and an authenticated broker.
//!
//! Overview
//! - Splits a trading day into pre-market, regular and post-market windows
//!   (America/New_York, DST-aware) and fetches each from the provider that
//!   covers it.
//! - Sources the regular session per instrument rule: `Hybrid` tries the
//!   primary first and falls back to the broker on an empty result;
//!   `BrokerOnly` never consults the primary.
//! - Merges each instrument's frames last-write-wins on `(symbol, ts)` and
//!   scores them against expected per-session counts.
//! - Commits the merged dataset idempotently in bounded batches.
//!
//! Failure model
//! - Providers never fail; errors degrade to empty rows and are logged.
//! - A required broker authentication failure aborts the run with no output.
//! - A failed persistence batch aborts the save; the dataset stays with the caller.
//!
//! Example
//! ```rust,ignore
//! use std::sync::Arc;
//! use harvest::{Harvester, HarvestMode};
//!
//! let harvester = Harvester::builder()
//!     .with_primary(Arc::new(YahooConnector::new_default()?))
//!     .with_broker(Arc::new(CapitalConnector::from_env()?))
//!     .build()?;
//!
//! let result = harvester
//!     .run(&["AAPL", "MSFT"], date, &inventory, HarvestMode::FullDay)
//!     .await?;
//! for o in &result.outcomes {
//!     println!("{} {} {}", o.symbol, o.mode, o.status);
//! }
//! harvester.commit(&store, &result.candles).await?;
//! ```
#![warn(missing_docs)]

pub(crate) mod core;
/// Persistence gateway.
pub mod persist;
/// Completeness reporter.
pub mod report;
mod router;

pub use core::{Harvester, HarvesterBuilder};
pub use persist::commit;
pub use report::{ReportCard, ReportRow};

// Re-export core types for convenience
pub use harvest_core::{
    BrokerProvider, BrokerSession, Candle, CandleSink, Clock, CommitSummary, ExchangeCalendar,
    ExpectedCounts, FixedClock, HarvestConfig, HarvestError, HarvestMode, HarvestOutcome,
    HarvestResult, InstrumentRule, Inventory, PersistConfig, PrimaryProvider, Provenance,
    Session, Status, Strategy, SystemClock, TimeWindow,
};
