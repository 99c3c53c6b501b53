//! harvest-capital
//!
//! Broker provider backed by the Capital.com REST API. Covers pre-market,
//! regular and post-market minute bars (bid side) for any epic.
//!
//! - Authentication posts the API key and login once per run; the returned
//!   `CST` / `X-SECURITY-TOKEN` pair is handed back to the caller as a
//!   [`BrokerSession`] and sent with every price request.
//! - The price endpoint only serves the last sixteen hours of minute data.
//!   Windows are clamped to that horizon (and to "now") before any request;
//!   a window with nothing left is answered locally with no network call.
//! - Transient failures (500/502/504, connect errors, timeouts) are retried
//!   with jittered exponential backoff. Whatever still fails is logged and
//!   degraded to an empty frame.
#![warn(missing_docs)]

mod backoff;
mod client;
mod config;
/// Lookback-horizon clamping applied before every price request.
pub mod lookback;
mod models;

use std::sync::Arc;

use async_trait::async_trait;
use harvest_core::normalize::broker_row_time;
use harvest_core::{
    BrokerProvider, BrokerRow, BrokerSession, Clock, HarvestError, SystemClock, TimeWindow, Tz,
};

use client::CapitalClient;
pub use backoff::{jitter_wait, retry_delay};
pub use config::{CapitalConfig, Credentials, ENV_API_KEY, ENV_IDENTIFIER, ENV_PASSWORD};

pub(crate) const CONNECTOR_NAME: &str = "harvest-capital";

/// Capital.com connector implementing [`BrokerProvider`].
pub struct CapitalConnector {
    client: CapitalClient,
    credentials: Credentials,
    cfg: CapitalConfig,
    clock: Arc<dyn Clock>,
}

impl CapitalConnector {
    /// Static connector key used in logs.
    pub const KEY: &'static str = CONNECTOR_NAME;

    /// Build from explicit credentials and configuration.
    ///
    /// # Errors
    /// Returns `HarvestError::Config` for an unusable base URL or an HTTP
    /// client that cannot be constructed.
    pub fn new(credentials: Credentials, cfg: CapitalConfig) -> Result<Self, HarvestError> {
        Ok(Self {
            client: CapitalClient::new(&cfg)?,
            credentials,
            cfg,
            clock: Arc::new(SystemClock),
        })
    }

    /// Build with credentials from the environment and the live endpoint.
    ///
    /// # Errors
    /// Returns `HarvestError::Config` when a credential variable is missing.
    pub fn from_env() -> Result<Self, HarvestError> {
        Self::new(Credentials::from_env()?, CapitalConfig::default())
    }

    /// Replace the wall clock used for lookback clamping.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &CapitalConfig {
        &self.cfg
    }
}

#[async_trait]
impl BrokerProvider for CapitalConnector {
    fn name(&self) -> &'static str {
        CONNECTOR_NAME
    }

    fn native_timezone(&self) -> Tz {
        self.cfg.native_tz
    }

    #[tracing::instrument(name = "harvest_capital::authenticate", skip(self))]
    async fn authenticate(&self) -> Result<BrokerSession, HarvestError> {
        let session = self.client.open_session(&self.credentials).await;
        match &session {
            Ok(_) => tracing::info!("broker session opened"),
            Err(e) => tracing::error!(error = %e, "broker session failed"),
        }
        session
    }

    #[tracing::instrument(
        name = "harvest_capital::fetch",
        skip(self, session, instrument_id, window),
        fields(epic = instrument_id, start = %window.start, end = %window.end),
    )]
    async fn fetch(
        &self,
        session: &BrokerSession,
        instrument_id: &str,
        window: TimeWindow,
    ) -> Vec<BrokerRow> {
        let now = self.clock.now();
        let Some(clamped) =
            lookback::clamp_window(window, now, self.cfg.lookback, self.cfg.clamp_margin)
        else {
            tracing::debug!(%now, "window outside broker horizon; no request");
            return Vec::new();
        };
        match self.client.prices(session, instrument_id, clamped).await {
            Ok(mut rows) => {
                // `to` is inclusive on the wire; windows are half-open.
                let fetched = rows.len();
                rows.retain(|r| {
                    broker_row_time(r, self.cfg.native_tz).is_some_and(|ts| window.contains(ts))
                });
                tracing::debug!(rows = rows.len(), dropped = fetched - rows.len(), "prices fetched");
                rows
            }
            Err(e) => {
                tracing::warn!(error = %e, "broker fetch failed");
                Vec::new()
            }
        }
    }
}
