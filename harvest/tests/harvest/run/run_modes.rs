use harvest::{HarvestMode, Provenance, Session, Status, Strategy};
use harvest_mock::MockBehavior;

use crate::helpers::{AAPL, MSFT, dt, hybrid, inventory, monday, rig};

#[tokio::test(start_paused = true)]
async fn pre_only_uses_broker_and_reports_bare_strategy() {
    let rig = rig(MockBehavior::Full, MockBehavior::Full);
    let inv = inventory([hybrid(AAPL)]);

    let out = rig
        .harvester
        .run(&[AAPL], monday(), &inv, HarvestMode::PreOnly)
        .await
        .unwrap();

    assert!(rig.primary.calls().await.is_empty());
    let calls = rig.broker.calls().await;
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].session, Some(Session::Pre));
    // 04:00 EDT
    assert_eq!(calls[0].window.start, dt(2024, 7, 15, 8, 0, 0));

    let o = &out.outcomes[0];
    assert_eq!(o.mode, Provenance::NotAttempted(Strategy::Hybrid));
    assert_eq!(o.mode.to_string(), "HYBRID");
    assert_eq!((o.pre_count, o.reg_count, o.post_count), (330, 0, 0));
    // the regular session was not harvested, so its absence is not a gap
    assert_eq!(o.status, Status::Complete);
}

#[tokio::test(start_paused = true)]
async fn post_only_covers_post_market() {
    let rig = rig(MockBehavior::Full, MockBehavior::Bars(100));
    let inv = inventory([hybrid(AAPL)]);

    let out = rig
        .harvester
        .run(&[AAPL], monday(), &inv, HarvestMode::PostOnly)
        .await
        .unwrap();

    let o = &out.outcomes[0];
    assert_eq!(o.post_count, 100);
    assert_eq!(o.status, Status::Gappy(vec![Session::Post]));
    assert!(
        out.candles
            .iter()
            .all(|c| c.ts >= dt(2024, 7, 15, 20, 0, 0) && c.session == Session::Post)
    );
}

#[tokio::test(start_paused = true)]
async fn full_day_without_extended_hours_is_gappy_pre_post() {
    let rig = rig(MockBehavior::Full, MockBehavior::Empty);
    let inv = inventory([hybrid(AAPL)]);

    let out = rig
        .harvester
        .run(&[AAPL], monday(), &inv, HarvestMode::FullDay)
        .await
        .unwrap();

    let o = &out.outcomes[0];
    assert_eq!(o.mode, Provenance::HybridPrimary);
    assert_eq!((o.pre_count, o.reg_count, o.post_count), (0, 390, 0));
    assert_eq!(o.status, Status::Gappy(vec![Session::Pre, Session::Post]));
    assert_eq!(o.status.to_string(), "Gappy (Pre, Post)");
}

#[tokio::test(start_paused = true)]
async fn results_follow_request_order() {
    let rig = rig(MockBehavior::Bars(3), MockBehavior::Empty);
    let inv = inventory([hybrid(AAPL), hybrid(MSFT)]);

    let out = rig
        .harvester
        .run(&[MSFT, AAPL], monday(), &inv, HarvestMode::RegOnly)
        .await
        .unwrap();

    let symbols: Vec<_> = out.outcomes.iter().map(|o| o.symbol.as_str()).collect();
    assert_eq!(symbols, vec![MSFT, AAPL]);
    let candle_symbols: Vec<_> = out.candles.iter().map(|c| c.symbol.as_str()).collect();
    assert_eq!(candle_symbols, vec![MSFT, MSFT, MSFT, AAPL, AAPL, AAPL]);
}
