#[cfg(feature = "test-adapters")]
use std::sync::Arc;

use async_trait::async_trait;
use harvest_core::{HarvestError, PrimaryRow, TimeWindow};
use reqwest::StatusCode;
use url::Url;

use crate::config::YahooConfig;
use crate::models::ChartEnvelope;

/// Chart abstraction (so we can inject mocks in tests).
#[async_trait]
pub trait YahooChart: Send + Sync {
    /// Fetch one-minute rows for `symbol` covering `window`.
    async fn fetch_minutes(
        &self,
        symbol: &str,
        window: TimeWindow,
    ) -> Result<Vec<PrimaryRow>, HarvestError>;
}

/// Production adapter talking to the v8 chart endpoint over `reqwest`.
///
/// `reqwest::Client` is `Clone + Send + Sync`, so no external locking is needed.
#[derive(Clone)]
pub struct RealAdapter {
    http: reqwest::Client,
    base: Url,
}

impl RealAdapter {
    /// Build an HTTP client from `cfg`.
    ///
    /// # Errors
    /// Returns `HarvestError::Config` if the base URL does not parse or the
    /// HTTP client cannot be constructed.
    pub fn new(cfg: &YahooConfig) -> Result<Self, HarvestError> {
        let base = Url::parse(&cfg.base_url)
            .map_err(|e| HarvestError::Config(format!("yahoo base url: {e}")))?;
        let http = reqwest::Client::builder()
            .timeout(cfg.timeout)
            .user_agent(cfg.user_agent.clone())
            .build()
            .map_err(|e| HarvestError::Config(format!("yahoo http client: {e}")))?;
        Ok(Self { http, base })
    }

    fn chart_url(&self, symbol: &str, window: TimeWindow) -> Result<Url, HarvestError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| HarvestError::Config("yahoo base url cannot be a base".into()))?
            .pop_if_empty()
            .extend(["v8", "finance", "chart", symbol]);
        url.query_pairs_mut()
            .append_pair("period1", &window.start.timestamp().to_string())
            .append_pair("period2", &window.end.timestamp().to_string())
            .append_pair("interval", "1m")
            .append_pair("includePrePost", "false");
        Ok(url)
    }
}

fn map_status(status: StatusCode, context: &str) -> HarvestError {
    match status {
        StatusCode::NOT_FOUND => HarvestError::not_found(context.to_string()),
        StatusCode::TOO_MANY_REQUESTS => {
            HarvestError::connector(crate::CONNECTOR_NAME, format!("rate limit: {context}"))
        }
        s if s.is_server_error() => HarvestError::connector(
            crate::CONNECTOR_NAME,
            format!("server error {s}: {context}"),
        ),
        s => HarvestError::connector(crate::CONNECTOR_NAME, format!("status {s}: {context}")),
    }
}

#[async_trait]
impl YahooChart for RealAdapter {
    async fn fetch_minutes(
        &self,
        symbol: &str,
        window: TimeWindow,
    ) -> Result<Vec<PrimaryRow>, HarvestError> {
        let context = format!("chart for {symbol}");
        let url = self.chart_url(symbol, window)?;
        let resp = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| HarvestError::connector(crate::CONNECTOR_NAME, e.to_string()))?;
        let status = resp.status();
        if !status.is_success() {
            // The endpoint reports unknown symbols as 404 with a chart.error body.
            return Err(map_status(status, &context));
        }
        let body: ChartEnvelope = resp
            .json()
            .await
            .map_err(|e| HarvestError::Data(format!("{context}: {e}")))?;
        body.into_rows(symbol)
    }
}

#[cfg(feature = "test-adapters")]
impl dyn YahooChart {
    /// Build a chart adapter from a closure. Test-only.
    pub fn from_fn<F>(f: F) -> Arc<dyn YahooChart>
    where
        F: Send
            + Sync
            + 'static
            + Fn(String, TimeWindow) -> Result<Vec<PrimaryRow>, HarvestError>,
    {
        struct FnChart<F>(F);
        #[async_trait]
        impl<F> YahooChart for FnChart<F>
        where
            F: Send
                + Sync
                + 'static
                + Fn(String, TimeWindow) -> Result<Vec<PrimaryRow>, HarvestError>,
        {
            async fn fetch_minutes(
                &self,
                symbol: &str,
                window: TimeWindow,
            ) -> Result<Vec<PrimaryRow>, HarvestError> {
                (self.0)(symbol.to_string(), window)
            }
        }
        Arc::new(FnChart(f))
    }
}
