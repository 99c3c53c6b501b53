use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use harvest_core::{Candle, CandleSink, HarvestError, Session, TimeWindow};
use rusqlite::{Connection, params};
use rust_decimal::Decimal;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};

use crate::{SqliteStore, storage};

pub(crate) fn ts_text(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, false)
}

fn to_real(d: Decimal) -> Option<f64> {
    d.to_f64()
}

fn write_batch(conn: &mut Connection, batch: &[Candle]) -> rusqlite::Result<()> {
    let tx = conn.transaction()?;
    {
        let mut stmt = tx.prepare_cached(
            "INSERT OR REPLACE INTO market_data
               (timestamp, symbol, open, high, low, close, volume, session)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        )?;
        for c in batch {
            stmt.execute(params![
                ts_text(c.ts),
                c.symbol,
                to_real(c.open),
                to_real(c.high),
                to_real(c.low),
                to_real(c.close),
                c.volume.and_then(to_real),
                c.session.code(),
            ])?;
        }
    }
    tx.commit()
}

#[async_trait]
impl CandleSink for SqliteStore {
    async fn upsert_batch(&self, batch: &[Candle]) -> Result<(), HarvestError> {
        let mut conn = self.lock()?;
        write_batch(&mut conn, batch).map_err(storage)
    }
}

struct StoredRow {
    ts: String,
    symbol: String,
    ohlc: [Option<f64>; 4],
    volume: Option<f64>,
    session: Option<String>,
}

impl StoredRow {
    fn into_candle(self) -> Result<Candle, HarvestError> {
        let Self {
            ts: raw_ts,
            symbol,
            ohlc,
            volume,
            session,
        } = self;
        let bad = |what: &str| HarvestError::Data(format!("market_data {symbol} {raw_ts}: {what}"));
        let ts = DateTime::parse_from_rfc3339(&raw_ts)
            .map_err(|_| bad("unparsable timestamp"))?
            .with_timezone(&Utc);
        let session: Session = session
            .as_deref()
            .ok_or_else(|| bad("missing session"))?
            .parse()?;
        let [Some(open), Some(high), Some(low), Some(close)] = ohlc.map(|v| v.and_then(Decimal::from_f64))
        else {
            return Err(bad("incomplete prices"));
        };
        Ok(Candle {
            ts,
            symbol,
            open,
            high,
            low,
            close,
            volume: volume.and_then(Decimal::from_f64),
            session,
        })
    }
}

impl SqliteStore {
    /// Candles of `symbol` with timestamps in `window`, oldest first.
    ///
    /// # Errors
    /// Returns `HarvestError::Storage` on query failure and
    /// `HarvestError::Data` for a row that cannot be decoded.
    pub fn load_candles(
        &self,
        symbol: &str,
        window: TimeWindow,
    ) -> Result<Vec<Candle>, HarvestError> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(
                "SELECT timestamp, symbol, open, high, low, close, volume, session
                 FROM market_data
                 WHERE symbol = ?1 AND timestamp >= ?2 AND timestamp < ?3
                 ORDER BY timestamp",
            )
            .map_err(storage)?;
        let rows = stmt
            .query_map(
                params![symbol, ts_text(window.start), ts_text(window.end)],
                |r| {
                    Ok(StoredRow {
                        ts: r.get(0)?,
                        symbol: r.get(1)?,
                        ohlc: [r.get(2)?, r.get(3)?, r.get(4)?, r.get(5)?],
                        volume: r.get(6)?,
                        session: r.get(7)?,
                    })
                },
            )
            .map_err(storage)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(storage)?;
        rows.into_iter().map(StoredRow::into_candle).collect()
    }

    /// Number of stored candles across all symbols.
    ///
    /// # Errors
    /// Returns `HarvestError::Storage` on query failure.
    pub fn candle_count(&self) -> Result<u64, HarvestError> {
        let conn = self.lock()?;
        let n: i64 = conn
            .query_row("SELECT COUNT(*) FROM market_data", [], |r| r.get(0))
            .map_err(storage)?;
        Ok(u64::try_from(n).unwrap_or(0))
    }
}
