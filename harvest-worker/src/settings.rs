use std::path::PathBuf;

use chrono::NaiveDate;
use harvest_core::{HarvestError, HarvestMode};

/// SQLite file holding the inventory and candles.
pub const ENV_DB_PATH: &str = "HARVEST_DB_PATH";
/// `full`, `pre`, `reg` or `post`.
pub const ENV_MODE: &str = "HARVEST_MODE";
/// Target date as `YYYY-MM-DD`; defaults to the smart market-day pick.
pub const ENV_DATE: &str = "HARVEST_DATE";
/// Comma-separated symbols; defaults to the whole inventory.
pub const ENV_SYMBOLS: &str = "HARVEST_SYMBOLS";
/// Where to write the JSON report card.
pub const ENV_REPORT_PATH: &str = "HARVEST_REPORT_PATH";
/// Any non-empty value swaps both providers for deterministic mocks.
pub const ENV_USE_MOCK: &str = "HARVEST_USE_MOCK";

const DEFAULT_DB_PATH: &str = "harvest.db";

/// Worker settings resolved from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerSettings {
    /// Database file.
    pub db_path: PathBuf,
    /// Sessions to harvest.
    pub mode: HarvestMode,
    /// Explicit target date; `None` picks one from the clock.
    pub date: Option<NaiveDate>,
    /// Explicit symbol list; `None` harvests the whole inventory.
    pub symbols: Option<Vec<String>>,
    /// JSON report destination.
    pub report_path: Option<PathBuf>,
    /// Use mock providers instead of the live APIs.
    pub use_mock: bool,
}

impl WorkerSettings {
    /// Read settings from the process environment.
    ///
    /// # Errors
    /// Returns `HarvestError::Config` for an unparsable mode or date.
    pub fn from_env() -> Result<Self, HarvestError> {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    /// Read settings through an arbitrary lookup. Blank values count as unset.
    ///
    /// # Errors
    /// Returns `HarvestError::Config` for an unparsable mode or date.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, HarvestError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |k: &str| {
            lookup(k)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let mode = match get(ENV_MODE) {
            Some(m) => m
                .parse()
                .map_err(|e| HarvestError::Config(format!("{ENV_MODE}: {e}")))?,
            None => HarvestMode::FullDay,
        };
        let date = get(ENV_DATE)
            .map(|d| {
                NaiveDate::parse_from_str(&d, "%Y-%m-%d")
                    .map_err(|e| HarvestError::Config(format!("{ENV_DATE}={d}: {e}")))
            })
            .transpose()?;
        let symbols = get(ENV_SYMBOLS)
            .map(|list| {
                list.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_ascii_uppercase)
                    .collect::<Vec<_>>()
            })
            .filter(|v| !v.is_empty());

        Ok(Self {
            db_path: get(ENV_DB_PATH).map_or_else(|| PathBuf::from(DEFAULT_DB_PATH), PathBuf::from),
            mode,
            date,
            symbols,
            report_path: get(ENV_REPORT_PATH).map(PathBuf::from),
            use_mock: get(ENV_USE_MOCK).is_some(),
        })
    }
}
