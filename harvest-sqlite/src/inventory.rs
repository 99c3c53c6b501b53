use harvest_core::{HarvestError, InstrumentRule, Inventory, Strategy};
use rusqlite::params;

use crate::{SqliteStore, storage};

impl SqliteStore {
    /// Load every inventory rule.
    ///
    /// # Errors
    /// Returns `HarvestError::Storage` on query failure and
    /// `HarvestError::Data` for a row whose strategy label is unknown.
    pub fn load_inventory(&self) -> Result<Inventory, HarvestError> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(
                "SELECT user_ticker, capital_epic, COALESCE(source_strategy, 'HYBRID')
                 FROM symbol_map ORDER BY user_ticker",
            )
            .map_err(storage)?;
        let rows = stmt
            .query_map([], |r| {
                Ok((
                    r.get::<_, String>(0)?,
                    r.get::<_, String>(1)?,
                    r.get::<_, String>(2)?,
                ))
            })
            .map_err(storage)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(storage)?;

        rows.into_iter()
            .map(|(symbol, epic, strategy)| {
                let strategy: Strategy = strategy
                    .parse()
                    .map_err(|e| HarvestError::Data(format!("symbol_map row {symbol}: {e}")))?;
                Ok(InstrumentRule::new(symbol, epic, strategy))
            })
            .collect()
    }

    /// Insert a rule, or update the epic and strategy of an existing symbol.
    ///
    /// # Errors
    /// Returns `HarvestError::InvalidArg` for a blank symbol or epic and
    /// `HarvestError::Storage` on write failure.
    pub fn upsert_rule(&self, rule: &InstrumentRule) -> Result<(), HarvestError> {
        if rule.symbol.trim().is_empty() || rule.broker_id.trim().is_empty() {
            return Err(HarvestError::InvalidArg(
                "inventory rule needs a symbol and a broker id".into(),
            ));
        }
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO symbol_map (user_ticker, capital_epic, source_strategy)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(user_ticker) DO UPDATE SET
               capital_epic = excluded.capital_epic,
               source_strategy = excluded.source_strategy",
            params![rule.symbol, rule.broker_id, rule.strategy.code()],
        )
        .map_err(storage)?;
        tracing::info!(symbol = %rule.symbol, epic = %rule.broker_id, strategy = %rule.strategy, "inventory rule saved");
        Ok(())
    }

    /// Remove `symbol` from the inventory. Returns whether a row was deleted.
    ///
    /// # Errors
    /// Returns `HarvestError::Storage` on write failure.
    pub fn delete_rule(&self, symbol: &str) -> Result<bool, HarvestError> {
        let conn = self.lock()?;
        let n = conn
            .execute("DELETE FROM symbol_map WHERE user_ticker = ?1", params![symbol])
            .map_err(storage)?;
        Ok(n > 0)
    }
}
