//! harvest-yahoo
//!
//! Primary provider backed by Yahoo Finance's v8 chart endpoint. Serves
//! one-minute bars for the regular session only; pre- and post-market
//! windows are rejected so extended hours always come from the broker.
//!
//! Every failure (transport, HTTP status, unknown symbol, malformed payload)
//! is logged and degraded to an empty frame at the [`PrimaryProvider`]
//! boundary, which is what lets the orchestrator fall back to the broker.
#![warn(missing_docs)]

/// Adapter definitions and the production adapter backed by `reqwest`.
pub mod adapter;
mod config;
mod models;

use std::sync::Arc;

use adapter::{RealAdapter, YahooChart};
#[cfg(feature = "test-adapters")]
use adapter::YahooChart;
use async_trait::async_trait;
use harvest_core::{
    ExchangeCalendar, HarvestError, PrimaryProvider, PrimaryRow, RawTimestamp, Session, TimeWindow,
    Tz,
};

pub use config::YahooConfig;

pub(crate) const CONNECTOR_NAME: &str = "harvest-yahoo";

#[cfg(feature = "test-adapters")]
type ChartAdapter = Arc<dyn YahooChart>;
#[cfg(not(feature = "test-adapters"))]
type ChartAdapter = Arc<RealAdapter>;

/// Yahoo Finance connector implementing [`PrimaryProvider`].
pub struct YahooConnector {
    chart: ChartAdapter,
    calendar: ExchangeCalendar,
}

impl YahooConnector {
    /// Static connector key used in logs.
    pub const KEY: &'static str = CONNECTOR_NAME;

    /// Build with the public endpoint and default HTTP settings.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new_default() -> Result<Self, HarvestError> {
        Self::with_config(&YahooConfig::default())
    }

    /// Build from an explicit configuration.
    ///
    /// # Errors
    /// Returns `HarvestError::Config` for an unparsable base URL or an HTTP
    /// client that cannot be constructed.
    pub fn with_config(cfg: &YahooConfig) -> Result<Self, HarvestError> {
        Ok(Self {
            chart: Arc::new(RealAdapter::new(cfg)?),
            calendar: ExchangeCalendar::default(),
        })
    }

    /// For tests/injection (requires the `test-adapters` feature).
    #[cfg(feature = "test-adapters")]
    #[must_use]
    pub fn from_adapter(chart: Arc<dyn YahooChart>) -> Self {
        Self {
            chart,
            calendar: ExchangeCalendar::default(),
        }
    }

    /// Use a different exchange calendar to decide what counts as the regular session.
    #[must_use]
    pub const fn with_calendar(mut self, calendar: ExchangeCalendar) -> Self {
        self.calendar = calendar;
        self
    }

    /// True when `window` is non-empty and lies inside the regular session
    /// of its exchange-local date.
    fn is_regular(&self, window: TimeWindow) -> bool {
        if window.is_empty() {
            return false;
        }
        let date = window
            .start
            .with_timezone(&self.calendar.timezone())
            .date_naive();
        let reg = self.calendar.window(date, Session::Reg);
        reg.start <= window.start && window.end <= reg.end
    }
}

fn in_window(row: &PrimaryRow, window: TimeWindow) -> bool {
    match row.ts {
        RawTimestamp::Epoch(secs) => {
            window.start.timestamp() <= secs && secs < window.end.timestamp()
        }
        // The chart endpoint only emits epoch seconds.
        _ => true,
    }
}

#[async_trait]
impl PrimaryProvider for YahooConnector {
    fn name(&self) -> &'static str {
        CONNECTOR_NAME
    }

    fn native_timezone(&self) -> Tz {
        self.calendar.timezone()
    }

    #[tracing::instrument(
        name = "harvest_yahoo::fetch",
        skip(self, instrument_id, window),
        fields(symbol = instrument_id, start = %window.start, end = %window.end),
    )]
    async fn fetch(&self, instrument_id: &str, window: TimeWindow) -> Vec<PrimaryRow> {
        if !self.is_regular(window) {
            tracing::warn!("window is not inside the regular session; primary serves regular hours only");
            return Vec::new();
        }
        match self.chart.fetch_minutes(instrument_id, window).await {
            Ok(rows) => {
                let rows: Vec<PrimaryRow> =
                    rows.into_iter().filter(|r| in_window(r, window)).collect();
                tracing::debug!(rows = rows.len(), "chart fetched");
                rows
            }
            Err(HarvestError::NotFound { what }) => {
                tracing::warn!(%what, "primary has no data");
                Vec::new()
            }
            Err(e) => {
                tracing::warn!(error = %e, "primary fetch failed");
                Vec::new()
            }
        }
    }
}
