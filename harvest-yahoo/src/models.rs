//! Wire shapes of the v8 chart endpoint.

use serde::Deserialize;

use harvest_core::{HarvestError, PrimaryRow, RawTimestamp};

#[derive(Debug, Deserialize)]
pub(crate) struct ChartEnvelope {
    pub chart: Chart,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Chart {
    #[serde(default)]
    pub result: Option<Vec<ChartData>>,
    #[serde(default)]
    pub error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChartError {
    pub code: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChartData {
    #[serde(default)]
    pub timestamp: Option<Vec<i64>>,
    pub indicators: Indicators,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Indicators {
    #[serde(default)]
    pub quote: Vec<QuoteColumns>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct QuoteColumns {
    #[serde(default)]
    pub open: Vec<Option<f64>>,
    #[serde(default)]
    pub high: Vec<Option<f64>>,
    #[serde(default)]
    pub low: Vec<Option<f64>>,
    #[serde(default)]
    pub close: Vec<Option<f64>>,
    #[serde(default)]
    pub volume: Vec<Option<f64>>,
}

fn at(col: &[Option<f64>], i: usize) -> Option<f64> {
    col.get(i).copied().flatten()
}

impl ChartEnvelope {
    /// Flatten the column-oriented payload into one row per timestamp.
    ///
    /// A payload without a result maps the upstream error code: `Not Found`
    /// becomes [`HarvestError::NotFound`], anything else a connector error.
    /// A result without timestamps (no trading in range) is an empty frame.
    pub(crate) fn into_rows(self, symbol: &str) -> Result<Vec<PrimaryRow>, HarvestError> {
        let Some(data) = self.chart.result.and_then(|r| r.into_iter().next()) else {
            return Err(match self.chart.error {
                Some(e) if e.code.eq_ignore_ascii_case("not found") => {
                    HarvestError::not_found(format!("chart for {symbol}"))
                }
                Some(e) => HarvestError::connector(
                    crate::CONNECTOR_NAME,
                    format!("{}: {}", e.code, e.description),
                ),
                None => HarvestError::Data(format!("chart for {symbol}: empty result")),
            });
        };
        let Some(timestamps) = data.timestamp else {
            return Ok(Vec::new());
        };
        let q = data.indicators.quote.into_iter().next().unwrap_or_default();
        Ok(timestamps
            .into_iter()
            .enumerate()
            .map(|(i, ts)| PrimaryRow {
                ts: RawTimestamp::Epoch(ts),
                open: at(&q.open, i),
                high: at(&q.high, i),
                low: at(&q.low, i),
                close: at(&q.close, i),
                volume: at(&q.volume, i),
            })
            .collect())
    }
}
