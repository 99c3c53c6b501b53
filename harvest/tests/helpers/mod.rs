// Shared fixtures so tests can `use crate::helpers::*;`
#![allow(dead_code)]

use chrono::NaiveDate;
use harvest::{Harvester, InstrumentRule, Inventory, Strategy};
use harvest_mock::{MockBehavior, MockBroker, MockController, MockPrimary};

/// Common symbol constants used across tests.
pub const AAPL: &str = "AAPL";
pub const MSFT: &str = "MSFT";
pub const NVDA: &str = "NVDA";
pub const TSLA: &str = "TSLA";

/// Monday 2024-07-15 (EDT).
pub fn monday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 7, 15).unwrap()
}

/// Construct a UTC `DateTime` from components for readability in tests.
pub fn dt(y: i32, m: u32, d: u32, hh: u32, mm: u32, ss: u32) -> chrono::DateTime<chrono::Utc> {
    NaiveDate::from_ymd_opt(y, m, d)
        .and_then(|d| d.and_hms_opt(hh, mm, ss))
        .expect("valid date-time")
        .and_utc()
}

/// Broker identifier used for `symbol` in test inventories.
pub fn epic(symbol: &str) -> String {
    format!("{symbol}.EPIC")
}

pub fn hybrid(symbol: &str) -> InstrumentRule {
    InstrumentRule::new(symbol, epic(symbol), Strategy::Hybrid)
}

pub fn broker_only(symbol: &str) -> InstrumentRule {
    InstrumentRule::new(symbol, epic(symbol), Strategy::BrokerOnly)
}

pub fn inventory(rules: impl IntoIterator<Item = InstrumentRule>) -> Inventory {
    rules.into_iter().collect()
}

/// Harvester wired to scripted providers plus their controllers.
pub struct Rig {
    pub harvester: Harvester,
    pub primary: MockController,
    pub broker: MockController,
}

pub fn rig(primary_default: MockBehavior, broker_default: MockBehavior) -> Rig {
    let (p, primary) = MockPrimary::new_with_controller("mock-primary", primary_default);
    let (b, broker) = MockBroker::new_with_controller("mock-broker", broker_default);
    let harvester = Harvester::builder()
        .with_primary(p)
        .with_broker(b)
        .build()
        .expect("both providers registered");
    Rig {
        harvester,
        primary,
        broker,
    }
}

/// `n` one-minute candles for `symbol` starting at `start`, all tagged `session`.
pub fn candles(
    symbol: &str,
    start: chrono::DateTime<chrono::Utc>,
    n: usize,
    session: harvest::Session,
) -> Vec<harvest::Candle> {
    (0..n)
        .map(|i| {
            let px = rust_decimal::Decimal::new(10_000 + i64::try_from(i).unwrap(), 2);
            harvest::Candle {
                ts: start + chrono::Duration::minutes(i64::try_from(i).unwrap()),
                symbol: symbol.to_string(),
                open: px,
                high: px,
                low: px,
                close: px,
                volume: Some(rust_decimal::Decimal::ONE),
                session,
            }
        })
        .collect()
}
