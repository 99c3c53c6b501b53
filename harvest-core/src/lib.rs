//! harvest-core
//!
//! Core traits and pure utilities shared across the harvest workspace.
//!
//! - `connector`: the provider traits adapters implement and the sink trait
//!   the persistence gateway writes through.
//! - `calendar`: exchange session windows and market-day selection.
//! - `normalize`: provider rows to canonical [`Candle`]s.
//! - `timeseries`: last-write-wins merge of candle frames.
//! - `clock`: injectable "now" for lookback and date selection.
//!
//! Async runtime (Tokio)
//! ---------------------
//! Traits are declared with `async_trait` and callers in this workspace drive
//! them on a Tokio 1.x runtime.
#![warn(missing_docs)]

/// Exchange session windows and market-day helpers.
pub mod calendar;
/// Injectable wall clock.
pub mod clock;
/// Provider and sink traits.
pub mod connector;
/// Provider row normalization.
pub mod normalize;
/// Time-series utilities for merging candle frames.
pub mod timeseries;
pub mod types;

pub use calendar::{ExchangeCalendar, TimeWindow};
pub use clock::{Clock, FixedClock, SystemClock};
pub use connector::{BrokerProvider, BrokerSession, CandleSink, PrimaryProvider};
pub use timeseries::merge::merge_frames;
pub use types::*;
