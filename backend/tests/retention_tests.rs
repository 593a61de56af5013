//! Request window and retention schedule tests
//!
//! Tests for the IST calendar rules including:
//! - Default ten-day listing window
//! - Whole-day date bounds
//! - Retention cutoff and daily sweep time

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use proptest::prelude::*;
use shared::time::{
    bounds_to_instants, default_request_window, ist, local_date, next_daily_run,
    resolve_request_window, retention_cutoff,
};
use shared::DateBounds;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    /// 20:00 UTC on the 10th is already the 11th in IST
    #[test]
    fn test_window_uses_local_date() {
        let now = utc(2024, 6, 10, 20, 0);
        let today = local_date(now, ist());

        assert_eq!(today, date(2024, 6, 11));
        let applied = resolve_request_window(DateBounds::default(), today);
        assert_eq!(applied.start_date, Some(date(2024, 6, 11)));
        assert_eq!(applied.end_date, Some(date(2024, 6, 20)));
    }

    #[test]
    fn test_explicit_bounds_kept() {
        let bounds = DateBounds {
            start_date: Some(date(2024, 1, 5)),
            end_date: None,
        };
        assert_eq!(resolve_request_window(bounds, date(2024, 6, 15)), bounds);
    }

    /// End date includes the whole last local day
    #[test]
    fn test_bounds_cover_whole_days() {
        let bounds = DateBounds {
            start_date: Some(date(2024, 6, 1)),
            end_date: Some(date(2024, 6, 10)),
        };
        let (from, until) = bounds_to_instants(bounds, ist());

        assert_eq!(from, Some(utc(2024, 5, 31, 18, 30)));
        assert_eq!(until, Some(utc(2024, 6, 10, 18, 30)));

        let late_on_tenth = utc(2024, 6, 10, 18, 29);
        assert!(late_on_tenth < until.unwrap());
    }

    #[test]
    fn test_retention_cutoff_twelve_months() {
        let now = utc(2024, 6, 15, 2, 0);
        assert_eq!(retention_cutoff(now, 12), utc(2023, 6, 15, 2, 0));
        assert_eq!(retention_cutoff(now, 0), now);
    }

    /// 02:00 IST is 20:30 UTC on the previous day
    #[test]
    fn test_next_run_at_two_am_ist() {
        let now = utc(2024, 6, 15, 12, 0);
        assert_eq!(next_daily_run(now, 2, ist()), utc(2024, 6, 15, 20, 30));

        let just_after = utc(2024, 6, 15, 20, 30);
        assert_eq!(next_daily_run(just_after, 2, ist()), utc(2024, 6, 16, 20, 30));
    }
}

// ============================================================================
// Property Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    fn instant_strategy() -> impl Strategy<Value = DateTime<Utc>> {
        (0i64..(20 * 365 * 24 * 3600))
            .prop_map(|secs| utc(2015, 1, 1, 0, 0) + Duration::seconds(secs))
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// The default window always contains today and stays within one block
        #[test]
        fn prop_window_contains_today(now in instant_strategy()) {
            let today = local_date(now, ist());
            let window = default_request_window(today);

            prop_assert!(window.contains(today));
            prop_assert!(window.start <= window.end);
            prop_assert!((window.end - window.start).num_days() <= 10);
            prop_assert!([1, 11, 21].contains(&chrono::Datelike::day(&window.start)));
        }

        /// The next run is in the future and at most one day away
        #[test]
        fn prop_next_run_within_a_day(now in instant_strategy(), hour in 0u32..24) {
            let next = next_daily_run(now, hour, ist());

            prop_assert!(next > now);
            prop_assert!(next - now <= Duration::days(1));
        }

        /// The cutoff never lies in the future
        #[test]
        fn prop_cutoff_not_after_now(now in instant_strategy(), months in 0u32..120) {
            prop_assert!(retention_cutoff(now, months) <= now);
        }
    }
}
