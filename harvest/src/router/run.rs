use std::collections::HashSet;

use chrono::NaiveDate;
use harvest_core::connector::BrokerSession;
use harvest_core::normalize;
use harvest_core::{
    Candle, HarvestError, HarvestMode, HarvestResult, InstrumentRule, Inventory, Provenance,
    Session, Strategy, TimeWindow, merge_frames,
};

use super::pacing::Pacer;
use crate::Harvester;
use crate::report;

/// Per-run state shared across instruments: the broker credential and the pacer.
struct RunCtx {
    session: Option<BrokerSession>,
    pacer: Pacer,
}

impl Harvester {
    /// Harvest `instruments` for the exchange-local `date`.
    ///
    /// Behavior:
    /// - Symbols missing from `inventory` are skipped with a warning and listed
    ///   in [`HarvestResult::skipped`]; repeated symbols are processed once.
    /// - A broker credential is required unless `mode` is `RegOnly` and every
    ///   known instrument is `Hybrid`. When required, a failed authentication
    ///   aborts the run before any fetch. Otherwise authentication is still
    ///   attempted so the hybrid fallback stays available.
    /// - Pre and post sessions always come from the broker. The regular session
    ///   follows the instrument's strategy; hybrid instruments fall back to the
    ///   broker only when the primary returns nothing.
    /// - Each instrument's frames are merged last-write-wins on `(symbol, ts)`
    ///   and scored against the configured expected counts.
    ///
    /// # Errors
    /// Returns `HarvestError::Authentication` when a required broker session
    /// cannot be obtained. Provider failures never surface as errors.
    #[tracing::instrument(
        name = "harvest::run",
        skip(self, instruments, inventory),
        fields(date = %date, mode = %mode, requested = instruments.len()),
    )]
    pub async fn run<S: AsRef<str>>(
        &self,
        instruments: &[S],
        date: NaiveDate,
        inventory: &Inventory,
        mode: HarvestMode,
    ) -> Result<HarvestResult, HarvestError> {
        let mut result = HarvestResult::default();
        let mut seen = HashSet::new();
        let mut rules: Vec<&InstrumentRule> = Vec::new();
        for sym in instruments {
            let sym = sym.as_ref();
            if !seen.insert(sym) {
                continue;
            }
            if let Some(rule) = inventory.get(sym) {
                rules.push(rule);
            } else {
                tracing::warn!(symbol = sym, "skipping symbol not in inventory");
                result.skipped.push(sym.to_string());
            }
        }
        if rules.is_empty() {
            tracing::warn!("no known instruments to harvest");
            return Ok(result);
        }

        let required = mode != HarvestMode::RegOnly
            || rules.iter().any(|r| r.strategy == Strategy::BrokerOnly);
        let mut ctx = RunCtx {
            session: self.open_broker_session(required).await?,
            pacer: Pacer::new(self.cfg.broker_pacing),
        };

        for rule in rules {
            tracing::info!(symbol = %rule.symbol, strategy = %rule.strategy, "processing instrument");
            let (candles, provenance) = self.harvest_instrument(rule, date, mode, &mut ctx).await;
            let outcome = report::outcome(
                &rule.symbol,
                provenance,
                &candles,
                mode,
                &self.cfg.expected,
                self.cfg.gap_threshold,
            );
            tracing::info!(
                symbol = %rule.symbol,
                mode = %outcome.mode,
                pre = outcome.pre_count,
                reg = outcome.reg_count,
                post = outcome.post_count,
                status = %outcome.status,
                "instrument harvested"
            );
            result.candles.extend(candles);
            result.outcomes.push(outcome);
        }

        Ok(result)
    }

    async fn open_broker_session(
        &self,
        required: bool,
    ) -> Result<Option<BrokerSession>, HarvestError> {
        match self.broker.authenticate().await {
            Ok(s) => Ok(Some(s)),
            Err(e) if required => {
                tracing::error!(broker = self.broker.name(), error = %e, "broker authentication failed; aborting run");
                Err(match e {
                    HarvestError::Authentication(_) => e,
                    other => HarvestError::Authentication(other.to_string()),
                })
            }
            Err(e) => {
                tracing::warn!(broker = self.broker.name(), error = %e, "broker authentication failed; fallback disabled");
                Ok(None)
            }
        }
    }

    async fn harvest_instrument(
        &self,
        rule: &InstrumentRule,
        date: NaiveDate,
        mode: HarvestMode,
        ctx: &mut RunCtx,
    ) -> (Vec<Candle>, Provenance) {
        let mut frames: Vec<Vec<Candle>> = Vec::with_capacity(3);
        let mut provenance = Provenance::NotAttempted(rule.strategy);

        for &session in mode.sessions() {
            let window = self.calendar.window(date, session);
            let frame = match session {
                Session::Pre | Session::Post => {
                    self.broker_frame(rule, session, window, ctx).await
                }
                Session::Reg => {
                    let (frame, p) = self.regular_frame(rule, window, ctx).await;
                    provenance = p;
                    frame
                }
            };
            if !frame.is_empty() {
                frames.push(frame);
            }
        }

        (merge_frames(frames), provenance)
    }

    async fn regular_frame(
        &self,
        rule: &InstrumentRule,
        window: TimeWindow,
        ctx: &mut RunCtx,
    ) -> (Vec<Candle>, Provenance) {
        if rule.strategy == Strategy::BrokerOnly {
            let frame = self.broker_frame(rule, Session::Reg, window, ctx).await;
            return (frame, Provenance::BrokerOnly);
        }

        let rows = self.primary.fetch(&rule.symbol, window).await;
        let frame = normalize::primary_rows(
            rows,
            &rule.symbol,
            Session::Reg,
            self.primary.native_timezone(),
        );
        if !frame.is_empty() {
            tracing::info!(symbol = %rule.symbol, provider = self.primary.name(), rows = frame.len(), "regular session from primary");
            return (frame, Provenance::HybridPrimary);
        }

        if ctx.session.is_none() {
            tracing::warn!(symbol = %rule.symbol, "primary empty and no broker session; fallback skipped");
            return (Vec::new(), Provenance::HybridFailed);
        }
        tracing::warn!(symbol = %rule.symbol, broker_id = %rule.broker_id, "primary empty; falling back to broker");
        let frame = self.broker_frame(rule, Session::Reg, window, ctx).await;
        if frame.is_empty() {
            tracing::warn!(symbol = %rule.symbol, "fallback empty; no regular session data");
            (frame, Provenance::HybridFailed)
        } else {
            tracing::info!(symbol = %rule.symbol, provider = self.broker.name(), rows = frame.len(), "regular session from fallback");
            (frame, Provenance::HybridFallback)
        }
    }

    async fn broker_frame(
        &self,
        rule: &InstrumentRule,
        session: Session,
        window: TimeWindow,
        ctx: &mut RunCtx,
    ) -> Vec<Candle> {
        let Some(credential) = ctx.session.as_ref() else {
            tracing::debug!(symbol = %rule.symbol, session = %session, "no broker session; skipping");
            return Vec::new();
        };
        ctx.pacer.wait().await;
        let rows = self.broker.fetch(credential, &rule.broker_id, window).await;
        tracing::debug!(symbol = %rule.symbol, session = %session, rows = rows.len(), "broker fetch");
        let mut frame =
            normalize::broker_rows(rows, &rule.symbol, session, self.broker.native_timezone());
        // Only bars inside the window carry this session's label.
        frame.retain(|c| window.contains(c.ts));
        frame
    }
}
