//! harvest-sqlite
//!
//! Local SQLite store for the harvest pipeline.
//!
//! - `symbol_map`: the instrument inventory (`user_ticker`, `capital_epic`,
//!   `source_strategy`), seeded with a default watch list on first open.
//! - `market_data`: minute candles keyed by `(symbol, timestamp)`; writes are
//!   `INSERT OR REPLACE`, so re-committing a dataset is a no-op.
//!
//! Timestamps are stored as RFC 3339 UTC text, which sorts chronologically.
#![warn(missing_docs)]

mod candles;
mod health;
mod inventory;
mod schema;

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use harvest_core::HarvestError;
use rusqlite::Connection;

pub use health::HealthMatrix;
pub use schema::DEFAULT_TICKERS;

pub(crate) fn storage(e: impl std::fmt::Display) -> HarvestError {
    HarvestError::Storage(e.to_string())
}

/// Inventory and candle store over one SQLite connection.
///
/// Calls are short and serialized through a mutex; the harvest pipeline is
/// sequential, so contention never arises in practice.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) the database at `path`, create missing tables and
    /// seed the default inventory if it is empty.
    ///
    /// # Errors
    /// Returns `HarvestError::Storage` if the file cannot be opened or the
    /// schema cannot be applied.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, HarvestError> {
        let conn = Connection::open(path.as_ref()).map_err(storage)?;
        Self::init(conn)
    }

    /// Open a private in-memory database, initialized like [`SqliteStore::open`].
    ///
    /// # Errors
    /// Returns `HarvestError::Storage` if the schema cannot be applied.
    pub fn open_in_memory() -> Result<Self, HarvestError> {
        let conn = Connection::open_in_memory().map_err(storage)?;
        Self::init(conn)
    }

    fn init(mut conn: Connection) -> Result<Self, HarvestError> {
        schema::create_tables(&conn).map_err(storage)?;
        let seeded = schema::seed_if_empty(&mut conn).map_err(storage)?;
        if seeded > 0 {
            tracing::info!(rows = seeded, "seeded default inventory");
        }
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub(crate) fn lock(&self) -> Result<MutexGuard<'_, Connection>, HarvestError> {
        self.conn
            .lock()
            .map_err(|_| HarvestError::Storage("connection mutex poisoned".into()))
    }
}
