//! Scheduled automation around the harvest orchestrator.
//!
//! One invocation validates its environment, picks the target date, loads the
//! inventory from SQLite, harvests it, commits the merged candles and writes a
//! report card. Any fatal error surfaces as `Err` so the binary can exit
//! non-zero.
#![warn(missing_docs)]

mod settings;

use std::sync::Arc;

use chrono::NaiveDate;
use harvest::{
    BrokerProvider, Clock, CommitSummary, ExchangeCalendar, HarvestError, Harvester,
    PrimaryProvider, ReportCard,
};
use harvest_capital::{CapitalConfig, CapitalConnector, Credentials};
use harvest_mock::{MockBehavior, MockBroker, MockPrimary};
use harvest_sqlite::SqliteStore;
use harvest_yahoo::YahooConnector;
use serde::Serialize;

pub use settings::{
    ENV_DATE, ENV_DB_PATH, ENV_MODE, ENV_REPORT_PATH, ENV_SYMBOLS, ENV_USE_MOCK, WorkerSettings,
};

/// What a successful invocation produced.
#[derive(Debug, Clone, Serialize)]
pub struct WorkerReport {
    /// Per-instrument completeness.
    pub card: ReportCard,
    /// Rows and batches written.
    pub committed: CommitSummary,
}

fn providers(
    settings: &WorkerSettings,
    clock: Arc<dyn Clock>,
) -> Result<(Arc<dyn PrimaryProvider>, Arc<dyn BrokerProvider>), HarvestError> {
    if settings.use_mock {
        tracing::warn!("using mock providers");
        let (primary, _) = MockPrimary::new_with_controller("mock-primary", MockBehavior::Full);
        let (broker, _) = MockBroker::new_with_controller("mock-broker", MockBehavior::Full);
        return Ok((primary, broker));
    }
    let broker = CapitalConnector::new(Credentials::from_env()?, CapitalConfig::default())?
        .with_clock(clock);
    let primary = YahooConnector::new_default()?;
    Ok((Arc::new(primary), Arc::new(broker)))
}

/// Target date: the explicit one, or the smart pick for `now`.
#[must_use]
pub fn target_date(
    settings: &WorkerSettings,
    calendar: &ExchangeCalendar,
    clock: &dyn Clock,
) -> NaiveDate {
    settings
        .date
        .unwrap_or_else(|| calendar.default_target_date(clock.now()))
}

/// Run one automation pass.
///
/// # Errors
/// Returns `HarvestError::Config` for missing credentials or an empty
/// inventory, `HarvestError::Authentication` when the broker rejects the
/// session, `HarvestError::Persistence` when a batch fails to commit, and
/// `HarvestError::Storage` for database or report-file failures.
#[tracing::instrument(name = "harvest_worker::run", skip_all, fields(mode = %settings.mode))]
pub async fn run(
    settings: &WorkerSettings,
    clock: Arc<dyn Clock>,
) -> Result<WorkerReport, HarvestError> {
    tracing::info!("starting automation");
    let (primary, broker) = providers(settings, Arc::clone(&clock))?;

    let calendar = ExchangeCalendar::default();
    let date = target_date(settings, &calendar, clock.as_ref());
    tracing::info!(%date, "target date selected");

    let store = SqliteStore::open(&settings.db_path)?;
    let inventory = store.load_inventory()?;
    if inventory.is_empty() {
        return Err(HarvestError::Config("no symbols in inventory".into()));
    }
    let symbols: Vec<String> = settings
        .symbols
        .clone()
        .unwrap_or_else(|| inventory.symbols().map(str::to_string).collect());
    tracing::info!(count = symbols.len(), "harvesting symbols");

    let harvester = Harvester::builder()
        .with_primary(primary)
        .with_broker(broker)
        .calendar(calendar)
        .build()?;
    let result = harvester
        .run(&symbols, date, &inventory, settings.mode)
        .await?;
    let card = ReportCard::new(date, settings.mode, &result);
    if card.failures > 0 {
        tracing::warn!(count = card.failures, "symbols failed completely");
    }
    if card.fallbacks > 0 {
        tracing::warn!(
            count = card.fallbacks,
            "symbols used broker fallback; volume may be unreliable"
        );
    }

    let committed = if result.candles.is_empty() {
        tracing::warn!("harvest returned no data; nothing to commit");
        CommitSummary::default()
    } else {
        tracing::info!(rows = result.candles.len(), "committing");
        harvester.commit(&store, &result.candles).await?
    };

    let report = WorkerReport { card, committed };
    if let Some(path) = &settings.report_path {
        let json = serde_json::to_vec_pretty(&report)
            .map_err(|e| HarvestError::Data(format!("report encoding: {e}")))?;
        std::fs::write(path, json).map_err(|e| {
            HarvestError::Storage(format!("report write to {}: {e}", path.display()))
        })?;
        tracing::info!(path = %path.display(), "report written");
    }
    tracing::info!(rows = report.committed.rows, "automation complete");
    Ok(report)
}
