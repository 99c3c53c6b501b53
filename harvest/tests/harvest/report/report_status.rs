use harvest::report::{outcome, session_counts};
use harvest::{ExpectedCounts, HarvestMode, Provenance, Session, Status};
use proptest::prelude::*;

use crate::helpers::{AAPL, candles, dt};

#[test]
fn regular_only_data_under_full_day_is_gappy_pre_post() {
    let reg = candles(AAPL, dt(2024, 7, 15, 13, 30, 0), 400, Session::Reg);
    let o = outcome(
        AAPL,
        Provenance::HybridPrimary,
        &reg,
        HarvestMode::FullDay,
        &ExpectedCounts::default(),
        0.9,
    );
    assert_eq!((o.pre_count, o.reg_count, o.post_count), (0, 400, 0));
    assert_eq!(o.status, Status::Gappy(vec![Session::Pre, Session::Post]));
}

#[test]
fn zero_total_is_failed() {
    let o = outcome(
        AAPL,
        Provenance::NotAttempted(harvest::Strategy::Hybrid),
        &[],
        HarvestMode::PreOnly,
        &ExpectedCounts::default(),
        0.9,
    );
    assert_eq!(o.status, Status::Failed);
    assert_eq!(o.status.to_string(), "Failed");
}

#[test]
fn abbreviated_day_counts_lower_the_bar() {
    // 13:00 close: 210 regular minutes
    let reg = candles(AAPL, dt(2024, 11, 29, 14, 30, 0), 210, Session::Reg);
    let half_day = ExpectedCounts {
        pre: 330,
        reg: 210,
        post: 0,
    };
    let o = outcome(
        AAPL,
        Provenance::HybridFallback,
        &reg,
        HarvestMode::RegOnly,
        &half_day,
        0.9,
    );
    assert_eq!(o.status, Status::CompleteFallback);
}

#[test]
fn counts_split_by_session() {
    let mut all = candles(AAPL, dt(2024, 7, 15, 8, 0, 0), 5, Session::Pre);
    all.extend(candles(AAPL, dt(2024, 7, 15, 20, 0, 0), 2, Session::Post));
    assert_eq!(session_counts(&all), [5, 0, 2]);
}

fn arb_mode() -> impl Strategy<Value = HarvestMode> {
    prop::sample::select(vec![
        HarvestMode::FullDay,
        HarvestMode::PreOnly,
        HarvestMode::RegOnly,
        HarvestMode::PostOnly,
    ])
}

proptest! {
    #[test]
    fn gaps_only_name_harvested_sessions(
        mode in arb_mode(),
        pre in 0usize..400,
        reg in 0usize..450,
        post in 0usize..300,
    ) {
        let mut all = candles(AAPL, dt(2024, 7, 15, 8, 0, 0), pre, Session::Pre);
        all.extend(candles(AAPL, dt(2024, 7, 15, 13, 30, 0), reg, Session::Reg));
        all.extend(candles(AAPL, dt(2024, 7, 15, 20, 0, 0), post, Session::Post));
        let o = outcome(AAPL, Provenance::HybridPrimary, &all, mode, &ExpectedCounts::default(), 0.9);

        prop_assert_eq!(o.total_count, pre + reg + post);
        match &o.status {
            Status::Failed => prop_assert_eq!(o.total_count, 0),
            Status::Gappy(gaps) => {
                prop_assert!(!gaps.is_empty());
                prop_assert!(gaps.iter().all(|s| mode.includes(*s)));
            }
            Status::Complete => prop_assert!(o.total_count > 0),
            Status::CompleteFallback => prop_assert!(false, "no fallback provenance given"),
        }
    }
}
