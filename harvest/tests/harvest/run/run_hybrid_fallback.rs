use harvest::{HarvestMode, Provenance, Session, Status};
use harvest_mock::MockBehavior;

use crate::helpers::{AAPL, MSFT, epic, hybrid, inventory, monday, rig};

#[tokio::test(start_paused = true)]
async fn empty_primary_falls_back_to_broker() {
    let rig = rig(MockBehavior::Full, MockBehavior::Empty);
    rig.primary.set_behavior(AAPL, MockBehavior::Empty).await;
    rig.broker
        .set_session_behavior(&epic(AAPL), Session::Reg, MockBehavior::Bars(380))
        .await;
    let inv = inventory([hybrid(AAPL)]);

    let out = rig
        .harvester
        .run(&[AAPL], monday(), &inv, HarvestMode::RegOnly)
        .await
        .unwrap();

    let o = &out.outcomes[0];
    assert_eq!(o.mode, Provenance::HybridFallback);
    assert_eq!(o.mode.to_string(), "HYBRID (fallback)");
    assert_eq!(o.reg_count, 380);
    assert_eq!(o.total_count, 380);
    assert_eq!(o.status, Status::CompleteFallback);
    assert_eq!(o.status.to_string(), "Complete (fallback)");
    assert_eq!(out.candles.len(), 380);
    assert!(
        out.candles
            .iter()
            .all(|c| c.symbol == AAPL && c.session == Session::Reg)
    );

    let calls = rig.broker.calls().await;
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].instrument_id, epic(AAPL));
    assert_eq!(calls[0].session, Some(Session::Reg));
}

#[tokio::test(start_paused = true)]
async fn full_day_fallback_covers_every_session() {
    let rig = rig(MockBehavior::Empty, MockBehavior::Full);
    let inv = inventory([hybrid(AAPL)]);

    let out = rig
        .harvester
        .run(&[AAPL], monday(), &inv, HarvestMode::FullDay)
        .await
        .unwrap();

    let o = &out.outcomes[0];
    assert_eq!((o.pre_count, o.reg_count, o.post_count), (330, 390, 240));
    assert_eq!(o.total_count, 960);
    assert_eq!(o.status, Status::CompleteFallback);
    assert!(out.candles.windows(2).all(|w| w[0].ts < w[1].ts));
}

#[tokio::test(start_paused = true)]
async fn non_empty_primary_never_calls_broker_for_regular() {
    let rig = rig(MockBehavior::Bars(10), MockBehavior::Full);
    let inv = inventory([hybrid(AAPL), hybrid(MSFT)]);

    let out = rig
        .harvester
        .run(&[AAPL, MSFT], monday(), &inv, HarvestMode::RegOnly)
        .await
        .unwrap();

    assert!(rig.broker.calls().await.is_empty());
    for o in &out.outcomes {
        assert_eq!(o.mode, Provenance::HybridPrimary);
        assert_eq!(o.reg_count, 10);
        assert_eq!(o.status.to_string(), "Gappy (Reg)");
    }
}

#[tokio::test(start_paused = true)]
async fn both_providers_empty_is_failed() {
    let rig = rig(MockBehavior::Empty, MockBehavior::Empty);
    let inv = inventory([hybrid(AAPL)]);

    let out = rig
        .harvester
        .run(&[AAPL], monday(), &inv, HarvestMode::RegOnly)
        .await
        .unwrap();

    let o = &out.outcomes[0];
    assert_eq!(o.mode, Provenance::HybridFailed);
    assert_eq!(o.mode.to_string(), "HYBRID (failed)");
    assert_eq!(o.total_count, 0);
    assert_eq!(o.status, Status::Failed);
    assert!(out.candles.is_empty());
    assert_eq!(rig.broker.calls().await.len(), 1);
}
