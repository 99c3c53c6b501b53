use chrono::{DateTime, TimeDelta, Utc};
use harvest_core::TimeWindow;

/// Fit `window` into what the price endpoint can serve at `now`.
///
/// A start older than `now - lookback` moves to the horizon plus `margin`.
/// An end in the future moves back to `now`. Returns `None` when nothing is
/// left to request, so the caller skips the network entirely.
#[must_use]
pub fn clamp_window(
    window: TimeWindow,
    now: DateTime<Utc>,
    lookback: TimeDelta,
    margin: TimeDelta,
) -> Option<TimeWindow> {
    let horizon = now - lookback;
    let mut start = window.start;
    if start < horizon {
        start = horizon + margin;
        tracing::warn!(
            requested = %window.start,
            clamped = %start,
            "start older than broker lookback; clamped to horizon"
        );
    }
    if start >= window.end {
        return None;
    }
    let end = window.end.min(now);
    if start >= end {
        return None;
    }
    Some(TimeWindow::new(start, end))
}
