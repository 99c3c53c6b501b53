use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;
use harvest_core::{BrokerRow, PrimaryRow, RawTimestamp, TimeWindow};

/// Deterministic price for `symbol` at the `i`-th minute of a window.
///
/// A per-symbol base between 20 and 420 plus a small saw-tooth.
fn price(symbol: &str, i: usize) -> f64 {
    let seed: u32 = symbol.bytes().map(u32::from).sum();
    let base = f64::from(seed % 400) + 20.0;
    let step = u32::try_from(i % 17).unwrap_or(0);
    base + f64::from(step) * 0.05
}

fn minute_starts(window: TimeWindow, bars: usize) -> impl Iterator<Item = (usize, DateTime<Utc>)> {
    let total = usize::try_from(window.minutes()).unwrap_or(0);
    (0..bars.min(total)).map(move |i| {
        let offset = i64::try_from(i).unwrap_or(0);
        (i, window.start + Duration::minutes(offset))
    })
}

/// `bars` primary rows starting at `window.start`, one per minute.
pub fn primary_rows(symbol: &str, window: TimeWindow, bars: usize) -> Vec<PrimaryRow> {
    minute_starts(window, bars)
        .map(|(i, ts)| {
            let p = price(symbol, i);
            PrimaryRow {
                ts: RawTimestamp::Epoch(ts.timestamp()),
                open: Some(p),
                high: Some(p + 0.1),
                low: Some(p - 0.1),
                close: Some(p + 0.05),
                volume: Some(1_000.0 + f64::from(u32::try_from(i).unwrap_or(0))),
            }
        })
        .collect()
}

/// `bars` broker rows starting at `window.start`, snapshot times in `native_tz`.
pub fn broker_rows(symbol: &str, window: TimeWindow, bars: usize, native_tz: Tz) -> Vec<BrokerRow> {
    minute_starts(window, bars)
        .map(|(i, ts)| {
            let p = price(symbol, i);
            BrokerRow {
                snapshot_time: ts
                    .with_timezone(&native_tz)
                    .format("%Y-%m-%dT%H:%M:%S")
                    .to_string(),
                snapshot_time_utc: None,
                open_bid: Some(p),
                high_bid: Some(p + 0.1),
                low_bid: Some(p - 0.1),
                close_bid: Some(p + 0.05),
                last_traded_volume: Some(500.0),
            }
        })
        .collect()
}
