use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use harvest::{
    BrokerProvider, BrokerSession, HarvestError, HarvestMode, Harvester, Session, TimeWindow,
};
use harvest_core::{BrokerRow, Tz};
use harvest_mock::{MockBehavior, MockPrimary};
use tokio::time::Instant;

use crate::helpers::{NVDA, broker_only, inventory, monday};

/// Broker that answers like a real price endpoint: slowly, with the `to`
/// bound inclusive.
struct InclusiveBroker {
    latency: Duration,
    calls: Mutex<Vec<(Instant, Instant)>>,
}

impl InclusiveBroker {
    fn new(latency: Duration) -> Arc<Self> {
        Arc::new(Self {
            latency,
            calls: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> Vec<(Instant, Instant)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl BrokerProvider for InclusiveBroker {
    fn name(&self) -> &'static str {
        "inclusive-broker"
    }

    fn native_timezone(&self) -> Tz {
        chrono_tz::Asia::Bahrain
    }

    async fn authenticate(&self) -> Result<BrokerSession, HarvestError> {
        Ok(BrokerSession::new("cst", "xst"))
    }

    async fn fetch(
        &self,
        _session: &BrokerSession,
        _instrument_id: &str,
        window: TimeWindow,
    ) -> Vec<BrokerRow> {
        let started = Instant::now();
        tokio::time::sleep(self.latency).await;
        let rows = (0..=window.minutes())
            .map(|i| {
                let ts = window.start + chrono::Duration::minutes(i);
                BrokerRow {
                    snapshot_time: String::new(),
                    snapshot_time_utc: Some(ts.format("%Y-%m-%dT%H:%M:%S").to_string()),
                    open_bid: Some(10.0),
                    high_bid: Some(10.5),
                    low_bid: Some(9.5),
                    close_bid: Some(10.2),
                    last_traded_volume: Some(100.0),
                }
            })
            .collect();
        self.calls.lock().unwrap().push((started, Instant::now()));
        rows
    }
}

fn harvester(broker: Arc<InclusiveBroker>) -> Harvester {
    let (p, _pc) = MockPrimary::new_with_controller("p", MockBehavior::Full);
    Harvester::builder()
        .with_primary(p)
        .with_broker(broker)
        .build()
        .unwrap()
}

#[tokio::test(start_paused = true)]
async fn slow_broker_calls_are_still_separated_by_the_pacing_delay() {
    let broker = InclusiveBroker::new(Duration::from_millis(300));
    let inv = inventory([broker_only(NVDA)]);

    harvester(Arc::clone(&broker))
        .run(&[NVDA], monday(), &inv, HarvestMode::FullDay)
        .await
        .unwrap();

    let calls = broker.calls();
    assert_eq!(calls.len(), 3);
    for pair in calls.windows(2) {
        let (_, prev_end) = pair[0];
        let (next_start, _) = pair[1];
        assert!(next_start - prev_end >= Duration::from_millis(200));
    }
}

#[tokio::test(start_paused = true)]
async fn bars_at_window_end_keep_their_own_session() {
    let broker = InclusiveBroker::new(Duration::ZERO);
    let inv = inventory([broker_only(NVDA)]);

    let out = harvester(broker)
        .run(&[NVDA], monday(), &inv, HarvestMode::FullDay)
        .await
        .unwrap();

    let o = &out.outcomes[0];
    assert_eq!((o.pre_count, o.reg_count, o.post_count), (330, 390, 240));
    let cal = harvest::ExchangeCalendar::default();
    for c in &out.candles {
        assert_eq!(cal.session_at(c.ts), Some(c.session), "{}", c.ts);
    }
    // 20:00 ET is outside every session
    let close = cal.window(monday(), Session::Post).end;
    assert!(out.candles.iter().all(|c| c.ts < close));
}

#[tokio::test(start_paused = true)]
async fn regular_only_broker_run_stops_at_the_close() {
    let broker = InclusiveBroker::new(Duration::ZERO);
    let inv = inventory([broker_only(NVDA)]);

    let out = harvester(broker)
        .run(&[NVDA], monday(), &inv, HarvestMode::RegOnly)
        .await
        .unwrap();

    assert_eq!(out.outcomes[0].reg_count, 390);
    assert!(out.candles.iter().all(|c| c.session == Session::Reg));
}
