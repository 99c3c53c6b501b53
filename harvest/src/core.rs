use std::sync::Arc;
use std::time::Duration;

use harvest_core::connector::{BrokerProvider, PrimaryProvider};
use harvest_core::{ExchangeCalendar, ExpectedCounts, HarvestConfig, HarvestError, PersistConfig};

/// Orchestrator that sources each session of a trading day from the right provider.
pub struct Harvester {
    pub(crate) primary: Arc<dyn PrimaryProvider>,
    pub(crate) broker: Arc<dyn BrokerProvider>,
    pub(crate) calendar: ExchangeCalendar,
    pub(crate) cfg: HarvestConfig,
}

/// Builder for constructing a `Harvester` with custom configuration.
pub struct HarvesterBuilder {
    primary: Option<Arc<dyn PrimaryProvider>>,
    broker: Option<Arc<dyn BrokerProvider>>,
    calendar: ExchangeCalendar,
    cfg: HarvestConfig,
}

impl Default for HarvesterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl HarvesterBuilder {
    /// Create a new builder with US-equity session hours and default pacing,
    /// expected counts and persistence batching.
    ///
    /// Both a primary provider and a broker must be registered before
    /// [`build`](Self::build).
    #[must_use]
    pub fn new() -> Self {
        Self {
            primary: None,
            broker: None,
            calendar: ExchangeCalendar::default(),
            cfg: HarvestConfig::default(),
        }
    }

    /// Register the free regular-session provider.
    #[must_use]
    pub fn with_primary(mut self, p: Arc<dyn PrimaryProvider>) -> Self {
        self.primary = Some(p);
        self
    }

    /// Register the authenticated broker.
    #[must_use]
    pub fn with_broker(mut self, b: Arc<dyn BrokerProvider>) -> Self {
        self.broker = Some(b);
        self
    }

    /// Replace the exchange calendar used to derive session windows.
    #[must_use]
    pub const fn calendar(mut self, calendar: ExchangeCalendar) -> Self {
        self.calendar = calendar;
        self
    }

    /// Replace the whole configuration.
    #[must_use]
    pub fn config(mut self, cfg: HarvestConfig) -> Self {
        self.cfg = cfg;
        self
    }

    /// Pause inserted before every broker call after the first one in a run.
    #[must_use]
    pub const fn broker_pacing(mut self, delay: Duration) -> Self {
        self.cfg.broker_pacing = delay;
        self
    }

    /// Expected per-session counts used by the completeness reporter.
    ///
    /// Lower them on abbreviated trading days so a half session is not
    /// reported as gappy.
    #[must_use]
    pub const fn expected_counts(mut self, expected: ExpectedCounts) -> Self {
        self.cfg.expected = expected;
        self
    }

    /// Fraction of the expected count below which a session is gappy.
    #[must_use]
    pub const fn gap_threshold(mut self, threshold: f64) -> Self {
        self.cfg.gap_threshold = threshold;
        self
    }

    /// Persistence batch size and inter-batch pause.
    #[must_use]
    pub const fn persist(mut self, persist: PersistConfig) -> Self {
        self.cfg.persist = persist;
        self
    }

    /// Build the `Harvester`.
    ///
    /// # Errors
    /// Returns `InvalidArg` if either provider is missing, the gap threshold
    /// is outside `[0, 1]`, or the persistence batch size is zero.
    pub fn build(self) -> Result<Harvester, HarvestError> {
        let Some(primary) = self.primary else {
            return Err(HarvestError::InvalidArg(
                "no primary provider registered; add one via with_primary(...)".to_string(),
            ));
        };
        let Some(broker) = self.broker else {
            return Err(HarvestError::InvalidArg(
                "no broker registered; add one via with_broker(...)".to_string(),
            ));
        };
        if !(0.0..=1.0).contains(&self.cfg.gap_threshold) {
            return Err(HarvestError::InvalidArg(format!(
                "gap threshold must be within [0, 1], got {}",
                self.cfg.gap_threshold
            )));
        }
        if self.cfg.persist.batch_size == 0 {
            return Err(HarvestError::InvalidArg(
                "persistence batch size must be non-zero".to_string(),
            ));
        }

        Ok(Harvester {
            primary,
            broker,
            calendar: self.calendar,
            cfg: self.cfg,
        })
    }
}

impl Harvester {
    /// Start building a new `Harvester`.
    ///
    /// ```rust,ignore
    /// let harvester = harvest::Harvester::builder()
    ///     .with_primary(Arc::new(YahooConnector::new_default()?))
    ///     .with_broker(Arc::new(CapitalConnector::from_env()?))
    ///     .broker_pacing(Duration::from_millis(200))
    ///     .build()?;
    /// ```
    #[must_use]
    pub fn builder() -> HarvesterBuilder {
        HarvesterBuilder::new()
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &HarvestConfig {
        &self.cfg
    }

    /// Calendar used to derive session windows.
    #[must_use]
    pub const fn calendar(&self) -> &ExchangeCalendar {
        &self.calendar
    }
}
