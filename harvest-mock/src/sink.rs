use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use harvest_core::connector::CandleSink;
use harvest_core::{Candle, HarvestError};

#[derive(Default)]
struct SinkState {
    rows: BTreeMap<(String, DateTime<Utc>), Candle>,
    attempts: Vec<usize>,
}

/// In-memory idempotent sink keyed by `(symbol, ts)`.
#[derive(Default)]
pub struct MockSink {
    fail_on_batch: Option<usize>,
    state: Mutex<SinkState>,
}

impl MockSink {
    /// Sink that accepts every batch.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sink that rejects the batch at zero-based index `batch`.
    #[must_use]
    pub fn failing_on(batch: usize) -> Self {
        Self {
            fail_on_batch: Some(batch),
            state: Mutex::default(),
        }
    }

    /// Stored candles ordered by `(symbol, ts)`.
    pub async fn rows(&self) -> Vec<Candle> {
        self.state.lock().await.rows.values().cloned().collect()
    }

    /// Size of every batch received, including a rejected one.
    pub async fn attempts(&self) -> Vec<usize> {
        self.state.lock().await.attempts.clone()
    }
}

#[async_trait]
impl CandleSink for MockSink {
    async fn upsert_batch(&self, batch: &[Candle]) -> Result<(), HarvestError> {
        let mut guard = self.state.lock().await;
        let index = guard.attempts.len();
        guard.attempts.push(batch.len());
        if self.fail_on_batch == Some(index) {
            return Err(HarvestError::Storage(format!("injected failure at batch {index}")));
        }
        for c in batch {
            guard.rows.insert((c.symbol.clone(), c.ts), c.clone());
        }
        Ok(())
    }
}
