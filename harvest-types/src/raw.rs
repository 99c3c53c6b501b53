//! Provider-shaped rows as returned by the adapters, before normalization.

use chrono::{DateTime, FixedOffset, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Timestamp as a provider reported it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RawTimestamp {
    /// Seconds since the Unix epoch.
    Epoch(i64),
    /// Timestamp carrying its own offset.
    Aware(DateTime<FixedOffset>),
    /// Wall-clock time in the provider's native zone.
    Naive(NaiveDateTime),
}

/// One row from the primary provider.
///
/// Price fields are optional because the upstream chart feed emits `null`
/// for minutes without trades.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrimaryRow {
    /// Interval start.
    pub ts: RawTimestamp,
    /// Opening price.
    pub open: Option<f64>,
    /// Highest price.
    pub high: Option<f64>,
    /// Lowest price.
    pub low: Option<f64>,
    /// Closing price.
    pub close: Option<f64>,
    /// Traded volume.
    pub volume: Option<f64>,
}

/// One row from the broker's price endpoint (bid side).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrokerRow {
    /// Snapshot time as reported, without an offset.
    pub snapshot_time: String,
    /// Snapshot time in UTC, when the broker includes it.
    pub snapshot_time_utc: Option<String>,
    /// Opening bid.
    pub open_bid: Option<f64>,
    /// Highest bid.
    pub high_bid: Option<f64>,
    /// Lowest bid.
    pub low_bid: Option<f64>,
    /// Closing bid.
    pub close_bid: Option<f64>,
    /// Last traded volume.
    pub last_traded_volume: Option<f64>,
}
