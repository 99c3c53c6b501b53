use harvest::{HarvestMode, ReportCard};
use harvest_mock::MockBehavior;

use crate::helpers::{AAPL, MSFT, NVDA, hybrid, inventory, monday, rig};

#[tokio::test(start_paused = true)]
async fn card_carries_labels_counts_and_skips() {
    let rig = rig(MockBehavior::Full, MockBehavior::Full);
    rig.primary.set_behavior(MSFT, MockBehavior::Empty).await;
    let inv = inventory([hybrid(AAPL), hybrid(MSFT)]);

    let out = rig
        .harvester
        .run(&[AAPL, MSFT, NVDA], monday(), &inv, HarvestMode::RegOnly)
        .await
        .unwrap();
    let card = ReportCard::new(monday(), HarvestMode::RegOnly, &out);

    assert_eq!(card.rows.len(), 2);
    assert_eq!(card.rows[0].mode, "HYBRID (primary)");
    assert_eq!(card.rows[0].status, "Complete");
    assert_eq!(card.rows[1].mode, "HYBRID (fallback)");
    assert_eq!(card.rows[1].status, "Complete (fallback)");
    assert_eq!(card.rows[1].reg, 390);
    assert_eq!(card.skipped, vec![NVDA.to_string()]);
    assert_eq!((card.failures, card.fallbacks), (0, 1));

    let table = card.to_string();
    assert!(table.starts_with("2024-07-15 REG_ONLY"));
    assert!(table.contains("HYBRID (fallback)"));
    assert!(table.contains("skipped: NVDA"));
}

#[tokio::test(start_paused = true)]
async fn card_exports_json() {
    let rig = rig(MockBehavior::Empty, MockBehavior::Empty);
    let inv = inventory([hybrid(AAPL)]);
    let out = rig
        .harvester
        .run(&[AAPL], monday(), &inv, HarvestMode::FullDay)
        .await
        .unwrap();

    let json = serde_json::to_value(ReportCard::new(monday(), HarvestMode::FullDay, &out)).unwrap();
    assert_eq!(json["date"], "2024-07-15");
    assert_eq!(json["mode"], "FULL_DAY");
    assert_eq!(json["failures"], 1);
    assert_eq!(json["rows"][0]["status"], "Failed");
    assert_eq!(json["rows"][0]["mode"], "HYBRID (failed)");
    assert_eq!(json["rows"][0]["total"], 0);
}
