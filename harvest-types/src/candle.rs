//! Canonical candle schema shared by every crate downstream of the normalizer.

use core::fmt;
use core::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::HarvestError;

/// Named sub-interval of a trading day.
///
/// Ordered chronologically: `Pre < Reg < Post`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Session {
    /// Pre-market.
    #[serde(rename = "PRE")]
    Pre,
    /// Regular trading hours.
    #[serde(rename = "REG")]
    Reg,
    /// Post-market.
    #[serde(rename = "POST")]
    Post,
}

impl Session {
    /// All sessions in chronological order.
    pub const ALL: [Self; 3] = [Self::Pre, Self::Reg, Self::Post];

    /// Storage label (`PRE`, `REG`, `POST`).
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Pre => "PRE",
            Self::Reg => "REG",
            Self::Post => "POST",
        }
    }

    /// Short human label used in completeness reports.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pre => "Pre",
            Self::Reg => "Reg",
            Self::Post => "Post",
        }
    }
}

impl fmt::Display for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Session {
    type Err = HarvestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PRE" => Ok(Self::Pre),
            "REG" | "REGULAR" => Ok(Self::Reg),
            "POST" => Ok(Self::Post),
            other => Err(HarvestError::InvalidArg(format!("unknown session: {other}"))),
        }
    }
}

/// One OHLCV point for a one-minute interval.
///
/// Identified by `(symbol, ts)`. Candles are never mutated once built; a later
/// candle with the same key supersedes an earlier one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candle {
    /// Interval start, UTC.
    pub ts: DateTime<Utc>,
    /// Canonical instrument symbol.
    pub symbol: String,
    /// Opening price.
    pub open: Decimal,
    /// Highest price.
    pub high: Decimal,
    /// Lowest price.
    pub low: Decimal,
    /// Closing price.
    pub close: Decimal,
    /// Traded volume, when the provider reports one.
    pub volume: Option<Decimal>,
    /// Session the candle was harvested for.
    pub session: Session,
}

impl Candle {
    /// The `(symbol, timestamp)` identity of this candle.
    #[must_use]
    pub fn key(&self) -> (&str, DateTime<Utc>) {
        (self.symbol.as_str(), self.ts)
    }
}
