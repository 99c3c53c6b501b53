use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use harvest_types::Candle;

/// Merge candle frames in fetch order (last is most recent).
///
/// - Candles are keyed by `(symbol, ts)`; the last appearance wins for duplicates.
/// - The output is sorted by timestamp, then symbol.
/// - Empty frames contribute nothing.
pub fn merge_frames<I>(frames: I) -> Vec<Candle>
where
    I: IntoIterator<Item = Vec<Candle>>,
{
    let mut by_key: BTreeMap<(DateTime<Utc>, String), Candle> = BTreeMap::new();
    for frame in frames {
        for c in frame {
            by_key.insert((c.ts, c.symbol.clone()), c);
        }
    }
    by_key.into_values().collect()
}
