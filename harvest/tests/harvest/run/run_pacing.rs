use std::time::Duration;

use harvest::{HarvestMode, Harvester};
use harvest_mock::{MockBehavior, MockBroker, MockPrimary};

use crate::helpers::{AAPL, MSFT, hybrid, inventory, monday, rig};

#[tokio::test(start_paused = true)]
async fn consecutive_broker_calls_are_paced() {
    let rig = rig(MockBehavior::Full, MockBehavior::Full);
    let inv = inventory([hybrid(AAPL), hybrid(MSFT)]);

    rig.harvester
        .run(&[AAPL, MSFT], monday(), &inv, HarvestMode::FullDay)
        .await
        .unwrap();

    let calls = rig.broker.calls().await;
    // pre + post for each instrument; regular came from the primary
    assert_eq!(calls.len(), 4);
    for pair in calls.windows(2) {
        assert!(pair[1].at - pair[0].at >= Duration::from_millis(200));
    }
}

#[tokio::test(start_paused = true)]
async fn pacing_is_configurable() {
    let (p, _pc) = MockPrimary::new_with_controller("p", MockBehavior::Empty);
    let (b, bc) = MockBroker::new_with_controller("b", MockBehavior::Full);
    let harvester = Harvester::builder()
        .with_primary(p)
        .with_broker(b)
        .broker_pacing(Duration::from_secs(1))
        .build()
        .unwrap();
    let inv = inventory([hybrid(AAPL)]);

    let start = tokio::time::Instant::now();
    harvester
        .run(&[AAPL], monday(), &inv, HarvestMode::FullDay)
        .await
        .unwrap();

    // pre, regular fallback, post
    let calls = bc.calls().await;
    assert_eq!(calls.len(), 3);
    assert_eq!(calls[0].at, start);
    assert!(calls[2].at - start >= Duration::from_secs(2));
}
