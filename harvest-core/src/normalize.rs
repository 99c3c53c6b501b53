//! Conversion of provider rows into canonical [`Candle`]s.
//!
//! Both variants share the same rules: timestamps end up in UTC, rows without
//! a complete OHLC quadruple are dropped, and every surviving row is tagged
//! with the caller's symbol and session.

use chrono::{DateTime, NaiveDateTime, Utc};
use chrono_tz::Tz;
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;

use crate::calendar::localize;
use harvest_types::{BrokerRow, Candle, PrimaryRow, RawTimestamp, Session};

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y/%m/%d %H:%M:%S",
];

fn price(v: Option<f64>) -> Option<Decimal> {
    v.and_then(Decimal::from_f64)
}

fn build(
    symbol: &str,
    session: Session,
    ts: DateTime<Utc>,
    ohlc: [Option<f64>; 4],
    volume: Option<f64>,
) -> Option<Candle> {
    let [open, high, low, close] = ohlc;
    Some(Candle {
        ts,
        symbol: symbol.to_string(),
        open: price(open)?,
        high: price(high)?,
        low: price(low)?,
        close: price(close)?,
        volume: price(volume),
        session,
    })
}

/// Resolve a provider timestamp to UTC, localizing naive values in `tz`.
#[must_use]
pub fn resolve_timestamp(ts: RawTimestamp, tz: Tz) -> Option<DateTime<Utc>> {
    match ts {
        RawTimestamp::Epoch(secs) => DateTime::from_timestamp(secs, 0),
        RawTimestamp::Aware(dt) => Some(dt.with_timezone(&Utc)),
        RawTimestamp::Naive(n) => Some(localize(tz, n)),
    }
}

/// Parse a timestamp string that may or may not carry an offset.
#[must_use]
pub fn parse_timestamp(raw: &str) -> Option<RawTimestamp> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(RawTimestamp::Aware(dt));
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(raw, f).ok())
        .map(RawTimestamp::Naive)
}

/// Normalize primary-provider rows. `tz` is the provider's native zone.
#[must_use]
pub fn primary_rows(rows: Vec<PrimaryRow>, symbol: &str, session: Session, tz: Tz) -> Vec<Candle> {
    let total = rows.len();
    let out: Vec<Candle> = rows
        .into_iter()
        .filter_map(|r| {
            let ts = resolve_timestamp(r.ts, tz)?;
            build(symbol, session, ts, [r.open, r.high, r.low, r.close], r.volume)
        })
        .collect();
    if out.len() < total {
        tracing::debug!(symbol, dropped = total - out.len(), "dropped incomplete primary rows");
    }
    out
}

/// UTC instant of a broker row.
///
/// `snapshot_time_utc` wins when present; otherwise `snapshot_time` is read
/// as wall-clock time in `native_tz`.
#[must_use]
pub fn broker_row_time(row: &BrokerRow, native_tz: Tz) -> Option<DateTime<Utc>> {
    match row.snapshot_time_utc.as_deref().and_then(parse_timestamp) {
        Some(RawTimestamp::Naive(n)) => Some(n.and_utc()),
        Some(other) => resolve_timestamp(other, native_tz),
        None => resolve_timestamp(parse_timestamp(&row.snapshot_time)?, native_tz),
    }
}

/// Normalize broker rows, resolving times with [`broker_row_time`].
#[must_use]
pub fn broker_rows(
    rows: Vec<BrokerRow>,
    symbol: &str,
    session: Session,
    native_tz: Tz,
) -> Vec<Candle> {
    let total = rows.len();
    let out: Vec<Candle> = rows
        .into_iter()
        .filter_map(|r| {
            let ts = broker_row_time(&r, native_tz)?;
            build(
                symbol,
                session,
                ts,
                [r.open_bid, r.high_bid, r.low_bid, r.close_bid],
                r.last_traded_volume,
            )
        })
        .collect();
    if out.len() < total {
        tracing::debug!(symbol, dropped = total - out.len(), "dropped incomplete broker rows");
    }
    out
}
