use harvest::{HarvestError, HarvestMode, Provenance, Status};
use harvest_mock::MockBehavior;

use crate::helpers::{AAPL, MSFT, NVDA, broker_only, hybrid, inventory, monday, rig};

#[tokio::test(start_paused = true)]
async fn full_day_auth_failure_aborts_before_any_fetch() {
    let rig = rig(MockBehavior::Full, MockBehavior::Full);
    rig.broker
        .fail_auth(HarvestError::Authentication("bad credentials".into()))
        .await;
    let inv = inventory([hybrid(AAPL), hybrid(MSFT)]);

    let err = rig
        .harvester
        .run(&[AAPL, MSFT], monday(), &inv, HarvestMode::FullDay)
        .await
        .unwrap_err();

    assert_eq!(err, HarvestError::Authentication("bad credentials".into()));
    assert!(err.is_fatal());
    assert!(rig.primary.calls().await.is_empty());
    assert!(rig.broker.calls().await.is_empty());
}

#[tokio::test(start_paused = true)]
async fn reg_only_with_broker_only_instrument_requires_auth() {
    let rig = rig(MockBehavior::Full, MockBehavior::Full);
    rig.broker
        .fail_auth(HarvestError::Authentication("expired".into()))
        .await;
    let inv = inventory([hybrid(AAPL), broker_only(NVDA)]);

    let err = rig
        .harvester
        .run(&[AAPL, NVDA], monday(), &inv, HarvestMode::RegOnly)
        .await
        .unwrap_err();

    assert!(matches!(err, HarvestError::Authentication(_)));
    assert!(rig.primary.calls().await.is_empty());
}

#[tokio::test(start_paused = true)]
async fn reg_only_hybrid_treats_auth_as_best_effort() {
    let rig = rig(MockBehavior::Full, MockBehavior::Full);
    rig.primary.set_behavior(MSFT, MockBehavior::Empty).await;
    rig.broker
        .fail_auth(HarvestError::Authentication("down".into()))
        .await;
    let inv = inventory([hybrid(AAPL), hybrid(MSFT)]);

    let out = rig
        .harvester
        .run(&[AAPL, MSFT], monday(), &inv, HarvestMode::RegOnly)
        .await
        .expect("auth is optional for hybrid regular-only runs");

    assert_eq!(rig.broker.auth_calls().await, 1);
    assert!(rig.broker.calls().await.is_empty());
    assert_eq!(out.outcomes[0].mode, Provenance::HybridPrimary);
    assert_eq!(out.outcomes[0].status, Status::Complete);
    assert_eq!(out.outcomes[1].mode, Provenance::HybridFailed);
    assert_eq!(out.outcomes[1].status, Status::Failed);
}

#[tokio::test(start_paused = true)]
async fn non_auth_broker_errors_surface_as_authentication() {
    let rig = rig(MockBehavior::Full, MockBehavior::Full);
    rig.broker
        .fail_auth(HarvestError::connector("capital", "connection reset"))
        .await;
    let inv = inventory([hybrid(AAPL)]);

    let err = rig
        .harvester
        .run(&[AAPL], monday(), &inv, HarvestMode::PreOnly)
        .await
        .unwrap_err();

    match err {
        HarvestError::Authentication(msg) => assert!(msg.contains("connection reset")),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn authenticates_once_per_run() {
    let rig = rig(MockBehavior::Full, MockBehavior::Full);
    let inv = inventory([hybrid(AAPL), hybrid(MSFT), broker_only(NVDA)]);

    rig.harvester
        .run(&[AAPL, MSFT, NVDA], monday(), &inv, HarvestMode::FullDay)
        .await
        .unwrap();

    assert_eq!(rig.broker.auth_calls().await, 1);
}
