use std::collections::BTreeMap;

use chrono::{DateTime, Days, NaiveDate, NaiveTime, Utc};
use harvest_core::calendar::localize;
use harvest_core::{HarvestError, Session, Tz};
use rusqlite::types::Value;
use rusqlite::params_from_iter;

use crate::candles::ts_text;
use crate::{SqliteStore, storage};

/// Candle counts per symbol per exchange-local day.
///
/// Symbols and days without candles are absent; [`HealthMatrix::count`]
/// reports them as zero.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HealthMatrix {
    cells: BTreeMap<String, BTreeMap<NaiveDate, u32>>,
}

impl HealthMatrix {
    /// Candles stored for `symbol` on `day`.
    #[must_use]
    pub fn count(&self, symbol: &str, day: NaiveDate) -> u32 {
        self.cells
            .get(symbol)
            .and_then(|days| days.get(&day))
            .copied()
            .unwrap_or(0)
    }

    /// Per-day counts of one symbol, oldest first.
    pub fn days(&self, symbol: &str) -> impl Iterator<Item = (NaiveDate, u32)> + '_ {
        self.cells
            .get(symbol)
            .into_iter()
            .flat_map(|days| days.iter().map(|(d, n)| (*d, *n)))
    }

    /// Symbols with at least one candle.
    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.cells.keys().map(String::as_str)
    }

    /// True when nothing matched.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

fn day_start(tz: Tz, day: NaiveDate) -> DateTime<Utc> {
    localize(tz, day.and_time(NaiveTime::MIN))
}

impl SqliteStore {
    /// Count candles per symbol per day over `from..=to` (exchange-local
    /// dates in `tz`), optionally restricted to one session.
    ///
    /// Days are bucketed in `tz` rather than UTC so a post-market session that
    /// runs past UTC midnight stays on its trading day.
    ///
    /// # Errors
    /// Returns `HarvestError::InvalidArg` when `from` is after `to` and
    /// `HarvestError::Storage` on query failure.
    pub fn health_matrix(
        &self,
        symbols: &[&str],
        from: NaiveDate,
        to: NaiveDate,
        session: Option<Session>,
        tz: Tz,
    ) -> Result<HealthMatrix, HarvestError> {
        if from > to {
            return Err(HarvestError::InvalidArg(format!(
                "health range is inverted: {from} > {to}"
            )));
        }
        let mut matrix = HealthMatrix::default();
        if symbols.is_empty() {
            return Ok(matrix);
        }
        let end_day = to
            .checked_add_days(Days::new(1))
            .ok_or_else(|| HarvestError::InvalidArg(format!("date out of range: {to}")))?;

        let placeholders = vec!["?"; symbols.len()].join(",");
        let mut sql = format!(
            "SELECT symbol, timestamp FROM market_data
             WHERE symbol IN ({placeholders}) AND timestamp >= ? AND timestamp < ?"
        );
        let mut args: Vec<Value> = symbols
            .iter()
            .map(|s| Value::Text((*s).to_string()))
            .collect();
        args.push(Value::Text(ts_text(day_start(tz, from))));
        args.push(Value::Text(ts_text(day_start(tz, end_day))));
        if let Some(s) = session {
            sql.push_str(" AND session = ?");
            args.push(Value::Text(s.code().to_string()));
        }

        let conn = self.lock()?;
        let mut stmt = conn.prepare(&sql).map_err(storage)?;
        let rows = stmt
            .query_map(params_from_iter(args), |r| {
                Ok((r.get::<_, String>(0)?, r.get::<_, String>(1)?))
            })
            .map_err(storage)?;
        for row in rows {
            let (symbol, ts) = row.map_err(storage)?;
            let Ok(ts) = DateTime::parse_from_rfc3339(&ts) else {
                tracing::debug!(%symbol, %ts, "skipping unparsable timestamp");
                continue;
            };
            let day = ts.with_timezone(&tz).date_naive();
            *matrix
                .cells
                .entry(symbol)
                .or_default()
                .entry(day)
                .or_default() += 1;
        }
        Ok(matrix)
    }
}
