//! Completeness scoring of one instrument's merged candles.

use core::fmt;

use chrono::NaiveDate;
use harvest_core::{
    Candle, ExpectedCounts, HarvestMode, HarvestOutcome, HarvestResult, Provenance, Session,
    Status,
};
use serde::Serialize;

const fn slot(s: Session) -> usize {
    match s {
        Session::Pre => 0,
        Session::Reg => 1,
        Session::Post => 2,
    }
}

/// Count candles per session, indexed `[pre, reg, post]`.
#[must_use]
pub fn session_counts(candles: &[Candle]) -> [usize; 3] {
    let mut counts = [0usize; 3];
    for c in candles {
        counts[slot(c.session)] += 1;
    }
    counts
}

/// Sessions harvested under `mode` whose count fell below `threshold` of expected.
#[must_use]
pub fn gappy_sessions(
    counts: [usize; 3],
    mode: HarvestMode,
    expected: &ExpectedCounts,
    threshold: f64,
) -> Vec<Session> {
    mode.sessions()
        .iter()
        .copied()
        .filter(|s| {
            let got = counts[slot(*s)];
            // counts are bounded by minutes in a day; f64 is exact here
            #[allow(clippy::cast_precision_loss)]
            let got = got as f64;
            got < f64::from(expected.for_session(*s)) * threshold
        })
        .collect()
}

/// Classify a result. Priority: `Failed`, then `Gappy`, then the complete variants.
#[must_use]
pub fn classify(total: usize, gaps: Vec<Session>, provenance: Provenance) -> Status {
    if total == 0 {
        Status::Failed
    } else if !gaps.is_empty() {
        Status::Gappy(gaps)
    } else if provenance.is_fallback() {
        Status::CompleteFallback
    } else {
        Status::Complete
    }
}

/// Build the report row for one instrument.
#[must_use]
pub fn outcome(
    symbol: &str,
    provenance: Provenance,
    candles: &[Candle],
    mode: HarvestMode,
    expected: &ExpectedCounts,
    threshold: f64,
) -> HarvestOutcome {
    let counts = session_counts(candles);
    let gaps = gappy_sessions(counts, mode, expected, threshold);
    let [pre_count, reg_count, post_count] = counts;
    HarvestOutcome {
        symbol: symbol.to_string(),
        mode: provenance,
        pre_count,
        reg_count,
        post_count,
        total_count: candles.len(),
        status: classify(candles.len(), gaps, provenance),
    }
}

/// One rendered line of the report card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportRow {
    /// Canonical symbol.
    pub symbol: String,
    /// Provenance label, e.g. `HYBRID (fallback)`.
    pub mode: String,
    /// Pre-market candles.
    pub pre: usize,
    /// Regular-session candles.
    pub reg: usize,
    /// Post-market candles.
    pub post: usize,
    /// All candles.
    pub total: usize,
    /// Status label, e.g. `Gappy (Pre, Post)`.
    pub status: String,
}

impl From<&HarvestOutcome> for ReportRow {
    fn from(o: &HarvestOutcome) -> Self {
        Self {
            symbol: o.symbol.clone(),
            mode: o.mode.to_string(),
            pre: o.pre_count,
            reg: o.reg_count,
            post: o.post_count,
            total: o.total_count,
            status: o.status.to_string(),
        }
    }
}

/// Human-readable summary of a run; `Display` renders a fixed-width table and
/// `Serialize` gives the JSON export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportCard {
    /// Exchange-local date harvested.
    pub date: NaiveDate,
    /// Sessions harvested.
    pub mode: HarvestMode,
    /// One row per processed instrument.
    pub rows: Vec<ReportRow>,
    /// Requested symbols missing from the inventory.
    pub skipped: Vec<String>,
    /// Instruments with no candles at all.
    pub failures: usize,
    /// Instruments whose regular session came from the broker fallback.
    pub fallbacks: usize,
}

impl ReportCard {
    /// Summarize `result` for `date` under `mode`.
    #[must_use]
    pub fn new(date: NaiveDate, mode: HarvestMode, result: &HarvestResult) -> Self {
        Self {
            date,
            mode,
            rows: result.outcomes.iter().map(ReportRow::from).collect(),
            skipped: result.skipped.clone(),
            failures: result.failures().count(),
            fallbacks: result.fallbacks().count(),
        }
    }
}

impl fmt::Display for ReportCard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} {}", self.date, self.mode)?;
        writeln!(
            f,
            "{:<8} {:<18} {:>5} {:>5} {:>5} {:>6}  {}",
            "Symbol", "Mode", "Pre", "Reg", "Post", "Total", "Status"
        )?;
        for r in &self.rows {
            writeln!(
                f,
                "{:<8} {:<18} {:>5} {:>5} {:>5} {:>6}  {}",
                r.symbol, r.mode, r.pre, r.reg, r.post, r.total, r.status
            )?;
        }
        if !self.skipped.is_empty() {
            writeln!(f, "skipped: {}", self.skipped.join(", "))?;
        }
        Ok(())
    }
}
