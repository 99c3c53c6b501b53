use harvest::{HarvestError, Harvester, PersistConfig};
use harvest_mock::{MockBehavior, MockBroker, MockPrimary};

#[test]
fn build_requires_both_providers() {
    let (p, _) = MockPrimary::new_with_controller("p", MockBehavior::Full);
    let (b, _) = MockBroker::new_with_controller("b", MockBehavior::Full);

    let err = Harvester::builder().with_primary(p).build().err().unwrap();
    assert!(matches!(err, HarvestError::InvalidArg(_)));
    let err = Harvester::builder().with_broker(b).build().err().unwrap();
    assert!(matches!(err, HarvestError::InvalidArg(_)));
}

#[test]
fn build_validates_thresholds_and_batches() {
    let rig = || {
        let (p, _) = MockPrimary::new_with_controller("p", MockBehavior::Full);
        let (b, _) = MockBroker::new_with_controller("b", MockBehavior::Full);
        Harvester::builder().with_primary(p).with_broker(b)
    };

    assert!(rig().gap_threshold(1.5).build().is_err());
    assert!(
        rig()
            .persist(PersistConfig {
                batch_size: 0,
                ..PersistConfig::default()
            })
            .build()
            .is_err()
    );
    let h = rig().gap_threshold(0.5).build().unwrap();
    assert!((h.config().gap_threshold - 0.5).abs() < f64::EPSILON);
}
