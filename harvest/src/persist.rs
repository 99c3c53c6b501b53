use harvest_core::connector::CandleSink;
use harvest_core::{Candle, CommitSummary, HarvestError, PersistConfig};

use crate::Harvester;

/// Write `candles` to `sink` in batches of `cfg.batch_size`, pausing
/// `cfg.batch_pause` between consecutive batches.
///
/// Inserts are idempotent on `(symbol, ts)`, so committing the same dataset
/// twice leaves the store unchanged. The first failing batch aborts the commit;
/// earlier batches stay written and later ones are not attempted. An empty
/// dataset is a no-op.
///
/// # Errors
/// Returns `HarvestError::Persistence` carrying the zero-based index of the
/// failing batch, or `InvalidArg` for a zero batch size.
#[tracing::instrument(
    name = "harvest::persist::commit",
    skip(sink, candles),
    fields(rows = candles.len(), batch_size = cfg.batch_size),
)]
pub async fn commit(
    sink: &dyn CandleSink,
    candles: &[Candle],
    cfg: &PersistConfig,
) -> Result<CommitSummary, HarvestError> {
    if cfg.batch_size == 0 {
        return Err(HarvestError::InvalidArg(
            "persistence batch size must be non-zero".into(),
        ));
    }
    if candles.is_empty() {
        tracing::info!("nothing to commit");
        return Ok(CommitSummary::default());
    }

    let mut summary = CommitSummary::default();
    for (i, batch) in candles.chunks(cfg.batch_size).enumerate() {
        if i > 0 && !cfg.batch_pause.is_zero() {
            tokio::time::sleep(cfg.batch_pause).await;
        }
        if let Err(e) = sink.upsert_batch(batch).await {
            tracing::error!(batch = i, error = %e, "batch commit failed; aborting save");
            return Err(HarvestError::persistence(i, e.to_string()));
        }
        tracing::debug!(batch = i, rows = batch.len(), "batch committed");
        summary.rows += batch.len();
        summary.batches += 1;
    }
    tracing::info!(rows = summary.rows, batches = summary.batches, "commit complete");
    Ok(summary)
}

impl Harvester {
    /// Commit `candles` through `sink` using this harvester's persistence settings.
    ///
    /// # Errors
    /// See [`commit`].
    pub async fn commit(
        &self,
        sink: &dyn CandleSink,
        candles: &[Candle],
    ) -> Result<CommitSummary, HarvestError> {
        commit(sink, candles, &self.cfg.persist).await
    }
}
