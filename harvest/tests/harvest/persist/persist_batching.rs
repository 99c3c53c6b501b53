use std::time::Duration;

use harvest::{HarvestError, PersistConfig, Session, commit};
use harvest_mock::MockSink;

use crate::helpers::{AAPL, MSFT, candles, dt};

fn dataset() -> Vec<harvest::Candle> {
    let mut all = candles(AAPL, dt(2024, 7, 15, 13, 30, 0), 150, Session::Reg);
    all.extend(candles(MSFT, dt(2024, 7, 15, 13, 30, 0), 100, Session::Reg));
    all
}

#[tokio::test(start_paused = true)]
async fn commits_in_batches_of_one_hundred() {
    let sink = MockSink::new();
    let start = tokio::time::Instant::now();

    let summary = commit(&sink, &dataset(), &PersistConfig::default())
        .await
        .unwrap();

    assert_eq!(summary.rows, 250);
    assert_eq!(summary.batches, 3);
    assert_eq!(sink.attempts().await, vec![100, 100, 50]);
    // two 50 ms pauses between three batches
    assert!(start.elapsed() >= Duration::from_millis(100));
}

#[tokio::test(start_paused = true)]
async fn failing_batch_aborts_remaining() {
    let sink = MockSink::failing_on(1);

    let err = commit(&sink, &dataset(), &PersistConfig::default())
        .await
        .unwrap_err();

    assert!(matches!(err, HarvestError::Persistence { batch: 1, .. }));
    assert!(err.is_fatal());
    assert_eq!(sink.attempts().await, vec![100, 100]);
    assert_eq!(sink.rows().await.len(), 100);
}

#[tokio::test(start_paused = true)]
async fn committing_twice_is_idempotent() {
    let sink = MockSink::new();
    let data = dataset();

    commit(&sink, &data, &PersistConfig::default()).await.unwrap();
    commit(&sink, &data, &PersistConfig::default()).await.unwrap();

    assert_eq!(sink.rows().await.len(), 250);
}

#[tokio::test]
async fn empty_dataset_is_a_no_op() {
    let sink = MockSink::new();
    let summary = commit(&sink, &[], &PersistConfig::default()).await.unwrap();
    assert_eq!(summary.rows, 0);
    assert!(sink.attempts().await.is_empty());
}

#[tokio::test]
async fn zero_batch_size_is_rejected() {
    let sink = MockSink::new();
    let cfg = PersistConfig {
        batch_size: 0,
        batch_pause: Duration::ZERO,
    };
    let err = commit(&sink, &dataset(), &cfg).await.unwrap_err();
    assert!(matches!(err, HarvestError::InvalidArg(_)));
}
