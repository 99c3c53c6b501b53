//! Outcome and report envelopes produced by a harvest run.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::candle::{Candle, Session};
use crate::instrument::Strategy;

/// Which provider path produced an instrument's regular-session data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Provenance {
    /// Regular session was not part of the run; carries the instrument's strategy.
    NotAttempted(Strategy),
    /// Regular session came from the broker by rule.
    BrokerOnly,
    /// Regular session came from the primary provider.
    HybridPrimary,
    /// Primary returned nothing; the broker filled in.
    HybridFallback,
    /// Neither provider returned regular-session data.
    HybridFailed,
}

impl Provenance {
    /// True when the regular session was sourced from the broker fallback.
    #[must_use]
    pub const fn is_fallback(self) -> bool {
        matches!(self, Self::HybridFallback)
    }
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotAttempted(strategy) => write!(f, "{strategy}"),
            Self::BrokerOnly => f.write_str("BROKER_ONLY"),
            Self::HybridPrimary => f.write_str("HYBRID (primary)"),
            Self::HybridFallback => f.write_str("HYBRID (fallback)"),
            Self::HybridFailed => f.write_str("HYBRID (failed)"),
        }
    }
}

/// Completeness classification of one instrument's harvest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    /// No candles at all.
    Failed,
    /// At least one harvested session fell below the gap threshold.
    Gappy(Vec<Session>),
    /// Every harvested session met the threshold.
    Complete,
    /// Complete, with the regular session filled by the broker fallback.
    CompleteFallback,
}

impl Status {
    /// True for either complete variant.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        matches!(self, Self::Complete | Self::CompleteFallback)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Failed => f.write_str("Failed"),
            Self::Complete => f.write_str("Complete"),
            Self::CompleteFallback => f.write_str("Complete (fallback)"),
            Self::Gappy(sessions) => {
                f.write_str("Gappy (")?;
                for (i, s) in sessions.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    f.write_str(s.label())?;
                }
                f.write_str(")")
            }
        }
    }
}

/// Per-instrument row of the completeness report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HarvestOutcome {
    /// Canonical symbol.
    pub symbol: String,
    /// Regular-session provenance.
    pub mode: Provenance,
    /// Pre-market candles after merge.
    pub pre_count: usize,
    /// Regular-session candles after merge.
    pub reg_count: usize,
    /// Post-market candles after merge.
    pub post_count: usize,
    /// All candles after merge.
    pub total_count: usize,
    /// Completeness classification.
    pub status: Status,
}

impl HarvestOutcome {
    /// Count for one session.
    #[must_use]
    pub const fn count(&self, session: Session) -> usize {
        match session {
            Session::Pre => self.pre_count,
            Session::Reg => self.reg_count,
            Session::Post => self.post_count,
        }
    }
}

/// Everything a run produced.
///
/// Candles are grouped by instrument in processing order and sorted by
/// timestamp within each instrument.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HarvestResult {
    /// Merged candles across all processed instruments.
    pub candles: Vec<Candle>,
    /// One outcome per processed instrument, in request order.
    pub outcomes: Vec<HarvestOutcome>,
    /// Requested symbols missing from the inventory.
    pub skipped: Vec<String>,
}

impl HarvestResult {
    /// Outcomes whose status is `Failed`.
    pub fn failures(&self) -> impl Iterator<Item = &HarvestOutcome> {
        self.outcomes.iter().filter(|o| o.status == Status::Failed)
    }

    /// Outcomes whose regular session came from the broker fallback.
    pub fn fallbacks(&self) -> impl Iterator<Item = &HarvestOutcome> {
        self.outcomes.iter().filter(|o| o.mode.is_fallback())
    }
}

/// Summary of a successful persistence commit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitSummary {
    /// Candles written.
    pub rows: usize,
    /// Batches issued.
    pub batches: usize,
}
