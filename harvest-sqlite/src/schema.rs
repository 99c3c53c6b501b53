use rusqlite::{Connection, params};

/// Instruments seeded into an empty inventory, all `HYBRID` with the symbol as epic.
pub const DEFAULT_TICKERS: [&str; 21] = [
    "AMD", "AMZN", "AAPL", "AVGO", "BABA", "GOOGL", "LRCX", "META", "MSFT", "MU", "NVDA", "ORCL",
    "PANW", "QCOM", "SHOP", "TSLA", "TSM", "SPY", "QQQ", "IWM", "DIA",
];

const DDL: &str = "
    CREATE TABLE IF NOT EXISTS symbol_map (
        user_ticker     TEXT PRIMARY KEY,
        capital_epic    TEXT NOT NULL,
        source_strategy TEXT DEFAULT 'HYBRID'
    );
    CREATE TABLE IF NOT EXISTS market_data (
        timestamp TEXT NOT NULL,
        symbol    TEXT NOT NULL,
        open REAL, high REAL, low REAL, close REAL, volume REAL, session TEXT,
        PRIMARY KEY (symbol, timestamp)
    );
";

pub(crate) fn create_tables(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(DDL)
}

/// Seed [`DEFAULT_TICKERS`] when `symbol_map` is empty. Returns rows inserted.
pub(crate) fn seed_if_empty(conn: &mut Connection) -> rusqlite::Result<usize> {
    let existing: i64 = conn.query_row("SELECT COUNT(*) FROM symbol_map", [], |r| r.get(0))?;
    if existing > 0 {
        return Ok(0);
    }
    let tx = conn.transaction()?;
    {
        let mut stmt = tx.prepare(
            "INSERT INTO symbol_map (user_ticker, capital_epic, source_strategy) VALUES (?1, ?2, 'HYBRID')",
        )?;
        for t in DEFAULT_TICKERS {
            stmt.execute(params![t, t])?;
        }
    }
    tx.commit()?;
    Ok(DEFAULT_TICKERS.len())
}
