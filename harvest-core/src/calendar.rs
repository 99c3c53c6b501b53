use chrono::offset::LocalResult;
use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc, Weekday};
use chrono_tz::Tz;

use harvest_types::Session;

/// Half-open UTC interval `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimeWindow {
    /// Inclusive start.
    pub start: DateTime<Utc>,
    /// Exclusive end.
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    /// Build a window from its bounds. Inverted bounds are kept as given.
    #[must_use]
    pub const fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// True when the window covers no instant (`start >= end`).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// Whole minutes covered; zero when empty.
    #[must_use]
    pub fn minutes(&self) -> i64 {
        if self.is_empty() {
            0
        } else {
            (self.end - self.start).num_minutes()
        }
    }

    /// Whether `ts` falls inside `[start, end)`.
    #[must_use]
    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        self.start <= ts && ts < self.end
    }
}

/// Exchange-local session boundaries in a named time zone.
///
/// Defaults to US equities: pre-market 04:00–09:30, regular 09:30–16:00 and
/// post-market 16:00–20:00, America/New_York. Windows for a date are derived
/// from these four wall-clock boundaries, so consecutive sessions always share
/// an endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExchangeCalendar {
    tz: Tz,
    pre_open: NaiveTime,
    reg_open: NaiveTime,
    reg_close: NaiveTime,
    post_close: NaiveTime,
}

impl Default for ExchangeCalendar {
    fn default() -> Self {
        Self::us_equities()
    }
}

fn hm(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap_or_default()
}

impl ExchangeCalendar {
    /// US equity session hours in America/New_York.
    #[must_use]
    pub fn us_equities() -> Self {
        Self {
            tz: chrono_tz::America::New_York,
            pre_open: hm(4, 0),
            reg_open: hm(9, 30),
            reg_close: hm(16, 0),
            post_close: hm(20, 0),
        }
    }

    /// Exchange time zone.
    #[must_use]
    pub const fn timezone(&self) -> Tz {
        self.tz
    }

    /// Local time the regular session opens.
    #[must_use]
    pub const fn regular_open(&self) -> NaiveTime {
        self.reg_open
    }

    const fn bounds(&self, session: Session) -> (NaiveTime, NaiveTime) {
        match session {
            Session::Pre => (self.pre_open, self.reg_open),
            Session::Reg => (self.reg_open, self.reg_close),
            Session::Post => (self.reg_close, self.post_close),
        }
    }

    /// UTC window of `session` on the exchange-local calendar `date`.
    #[must_use]
    pub fn window(&self, date: NaiveDate, session: Session) -> TimeWindow {
        let (open, close) = self.bounds(session);
        TimeWindow::new(
            localize(self.tz, date.and_time(open)),
            localize(self.tz, date.and_time(close)),
        )
    }

    /// Windows of all three sessions on `date`, in chronological order.
    #[must_use]
    pub fn day_windows(&self, date: NaiveDate) -> [(Session, TimeWindow); 3] {
        Session::ALL.map(|s| (s, self.window(date, s)))
    }

    /// Session containing `ts` on its exchange-local date, if any.
    #[must_use]
    pub fn session_at(&self, ts: DateTime<Utc>) -> Option<Session> {
        let date = ts.with_timezone(&self.tz).date_naive();
        Session::ALL
            .into_iter()
            .find(|s| self.window(date, *s).contains(ts))
    }

    /// Minutes in `session` on a full trading day (330 / 390 / 240 by default).
    #[must_use]
    pub fn expected_minutes(&self, session: Session) -> u32 {
        let (open, close) = self.bounds(session);
        u32::try_from((close - open).num_minutes()).unwrap_or(0)
    }

    /// Date a scheduled harvest at `now` should target.
    ///
    /// Before the regular open the current day has no regular data yet, so
    /// the previous market day is used; weekends roll back to Friday.
    #[must_use]
    pub fn default_target_date(&self, now: DateTime<Utc>) -> NaiveDate {
        let local = now.with_timezone(&self.tz);
        let today = local.date_naive();
        if local.time() < self.reg_open {
            previous_market_day(today)
        } else {
            market_day_on_or_before(today)
        }
    }
}

/// Latest weekday on or before `date`.
#[must_use]
pub fn market_day_on_or_before(date: NaiveDate) -> NaiveDate {
    match date.weekday() {
        Weekday::Sat => date - Duration::days(1),
        Weekday::Sun => date - Duration::days(2),
        _ => date,
    }
}

/// Latest weekday strictly before `date`.
#[must_use]
pub fn previous_market_day(date: NaiveDate) -> NaiveDate {
    market_day_on_or_before(date - Duration::days(1))
}

/// Interpret a wall-clock time in `tz` and convert it to UTC.
///
/// Ambiguous times (DST fall-back) resolve to the earlier instant. Times that
/// do not exist (DST spring-forward) are moved forward by the gap.
#[must_use]
pub fn localize(tz: Tz, local: NaiveDateTime) -> DateTime<Utc> {
    match tz.from_local_datetime(&local) {
        LocalResult::Single(t) => t.with_timezone(&Utc),
        LocalResult::Ambiguous(earliest, _) => earliest.with_timezone(&Utc),
        LocalResult::None => tz
            .from_local_datetime(&(local + Duration::hours(1)))
            .earliest()
            .map_or_else(|| Utc.from_utc_datetime(&local), |t| t.with_timezone(&Utc)),
    }
}
