//! Wire shapes of the session and prices endpoints.

use harvest_core::BrokerRow;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub(crate) struct SessionRequest<'a> {
    pub identifier: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PricesResponse {
    #[serde(default)]
    pub prices: Vec<PricePoint>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct Quote {
    #[serde(default)]
    pub bid: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PricePoint {
    #[serde(default)]
    pub snapshot_time: String,
    #[serde(default, rename = "snapshotTimeUTC")]
    pub snapshot_time_utc: Option<String>,
    #[serde(default)]
    pub open_price: Option<Quote>,
    #[serde(default)]
    pub high_price: Option<Quote>,
    #[serde(default)]
    pub low_price: Option<Quote>,
    #[serde(default)]
    pub close_price: Option<Quote>,
    #[serde(default)]
    pub last_traded_volume: Option<f64>,
}

fn bid(q: Option<Quote>) -> Option<f64> {
    q.and_then(|q| q.bid)
}

impl From<PricePoint> for BrokerRow {
    fn from(p: PricePoint) -> Self {
        Self {
            snapshot_time: p.snapshot_time,
            snapshot_time_utc: p.snapshot_time_utc,
            open_bid: bid(p.open_price),
            high_bid: bid(p.high_price),
            low_bid: bid(p.low_price),
            close_bid: bid(p.close_price),
            last_traded_volume: p.last_traded_volume,
        }
    }
}
