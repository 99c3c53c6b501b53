use harvest::{HarvestMode, Provenance, Session, Status};
use harvest_mock::MockBehavior;

use crate::helpers::{AAPL, NVDA, broker_only, epic, hybrid, inventory, monday, rig};

#[tokio::test(start_paused = true)]
async fn broker_only_never_calls_primary() {
    let rig = rig(MockBehavior::Full, MockBehavior::Full);
    let inv = inventory([broker_only(NVDA)]);

    let out = rig
        .harvester
        .run(&[NVDA], monday(), &inv, HarvestMode::FullDay)
        .await
        .unwrap();

    assert!(rig.primary.calls().await.is_empty());
    let sessions: Vec<_> = rig
        .broker
        .calls_for(&epic(NVDA))
        .await
        .into_iter()
        .map(|c| c.session)
        .collect();
    assert_eq!(
        sessions,
        vec![Some(Session::Pre), Some(Session::Reg), Some(Session::Post)]
    );

    let o = &out.outcomes[0];
    assert_eq!(o.mode, Provenance::BrokerOnly);
    assert_eq!(o.mode.to_string(), "BROKER_ONLY");
    assert_eq!(o.total_count, 960);
    assert_eq!(o.status, Status::Complete);
}

#[tokio::test(start_paused = true)]
async fn empty_broker_only_regular_is_not_retried_on_primary() {
    let rig = rig(MockBehavior::Full, MockBehavior::Empty);
    let inv = inventory([broker_only(NVDA)]);

    let out = rig
        .harvester
        .run(&[NVDA], monday(), &inv, HarvestMode::RegOnly)
        .await
        .unwrap();

    assert!(rig.primary.calls().await.is_empty());
    assert_eq!(out.outcomes[0].mode, Provenance::BrokerOnly);
    assert_eq!(out.outcomes[0].status, Status::Failed);
}

#[tokio::test(start_paused = true)]
async fn mixed_inventory_routes_per_rule() {
    let rig = rig(MockBehavior::Full, MockBehavior::Full);
    let inv = inventory([broker_only(NVDA), hybrid(AAPL)]);

    let out = rig
        .harvester
        .run(&[NVDA, AAPL], monday(), &inv, HarvestMode::RegOnly)
        .await
        .unwrap();

    let primary_ids: Vec<_> = rig
        .primary
        .calls()
        .await
        .into_iter()
        .map(|c| c.instrument_id)
        .collect();
    assert_eq!(primary_ids, vec![AAPL.to_string()]);
    let broker_ids: Vec<_> = rig
        .broker
        .calls()
        .await
        .into_iter()
        .map(|c| c.instrument_id)
        .collect();
    assert_eq!(broker_ids, vec![epic(NVDA)]);
    assert_eq!(out.outcomes[0].mode, Provenance::BrokerOnly);
    assert_eq!(out.outcomes[1].mode, Provenance::HybridPrimary);
}
