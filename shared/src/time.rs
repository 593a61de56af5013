//! Calendar helpers in the cooperative's local time (IST, UTC+05:30)

use chrono::{
    DateTime, Datelike, Duration, FixedOffset, Months, NaiveDate, Offset, TimeZone, Utc,
};

use crate::types::{DateBounds, DateRange};

/// Offset of Indian Standard Time from UTC, in seconds
pub const IST_OFFSET_SECS: i32 = 5 * 3600 + 30 * 60;

/// Indian Standard Time as a fixed offset
pub fn ist() -> FixedOffset {
    FixedOffset::east_opt(IST_OFFSET_SECS).unwrap_or_else(|| Utc.fix())
}

/// Calendar date of `now` in `offset`
pub fn local_date(now: DateTime<Utc>, offset: FixedOffset) -> NaiveDate {
    now.with_timezone(&offset).date_naive()
}

fn last_day_of_month(date: NaiveDate) -> NaiveDate {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|first| first.pred_opt())
        .unwrap_or(date)
}

/// The ten-day block of the month containing `today`
///
/// Days 1–10, 11–20, or 21 through the last day of the month.
pub fn default_request_window(today: NaiveDate) -> DateRange {
    let (start_day, end) = match today.day() {
        1..=10 => (1, today.with_day(10)),
        11..=20 => (11, today.with_day(20)),
        _ => (21, Some(last_day_of_month(today))),
    };
    DateRange::new(
        today.with_day(start_day).unwrap_or(today),
        end.unwrap_or(today),
    )
}

/// Fill in the default window when the caller gave no bounds at all
pub fn resolve_request_window(bounds: DateBounds, today: NaiveDate) -> DateBounds {
    if bounds.is_empty() {
        let window = default_request_window(today);
        DateBounds {
            start_date: Some(window.start),
            end_date: Some(window.end),
        }
    } else {
        bounds
    }
}

fn local_midnight(date: NaiveDate, offset: FixedOffset) -> Option<DateTime<Utc>> {
    let naive = date.and_hms_opt(0, 0, 0)?;
    offset
        .from_local_datetime(&naive)
        .single()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Half-open UTC instants `[start, end)` covering whole local days
///
/// The end bound is midnight after `end_date`, so the whole of the last day is
/// included.
pub fn bounds_to_instants(
    bounds: DateBounds,
    offset: FixedOffset,
) -> (Option<DateTime<Utc>>, Option<DateTime<Utc>>) {
    let start = bounds
        .start_date
        .and_then(|date| local_midnight(date, offset));
    let end = bounds
        .end_date
        .and_then(|date| date.succ_opt())
        .and_then(|date| local_midnight(date, offset));
    (start, end)
}

/// Requests created before this instant are eligible for the retention sweep
pub fn retention_cutoff(now: DateTime<Utc>, months: u32) -> DateTime<Utc> {
    now.checked_sub_months(Months::new(months))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Next instant strictly after `now` at `hour`:00 local time
pub fn next_daily_run(now: DateTime<Utc>, hour: u32, offset: FixedOffset) -> DateTime<Utc> {
    let local_today = local_date(now, offset);
    let at = |date: NaiveDate| {
        date.and_hms_opt(hour.min(23), 0, 0)
            .and_then(|naive| offset.from_local_datetime(&naive).single())
            .map(|dt| dt.with_timezone(&Utc))
    };

    match at(local_today) {
        Some(run) if run > now => run,
        Some(run) => run + Duration::days(1),
        None => now + Duration::days(1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_default_window_blocks() {
        assert_eq!(
            default_request_window(date(2024, 3, 1)),
            DateRange::new(date(2024, 3, 1), date(2024, 3, 10))
        );
        assert_eq!(
            default_request_window(date(2024, 3, 15)),
            DateRange::new(date(2024, 3, 11), date(2024, 3, 20))
        );
        assert_eq!(
            default_request_window(date(2024, 3, 21)),
            DateRange::new(date(2024, 3, 21), date(2024, 3, 31))
        );
    }

    #[test]
    fn test_default_window_month_ends() {
        assert_eq!(default_request_window(date(2024, 2, 29)).end, date(2024, 2, 29));
        assert_eq!(default_request_window(date(2023, 2, 25)).end, date(2023, 2, 28));
        assert_eq!(default_request_window(date(2024, 12, 31)).end, date(2024, 12, 31));
        assert_eq!(default_request_window(date(2024, 4, 30)).end, date(2024, 4, 30));
    }

    #[test]
    fn test_resolve_keeps_partial_bounds() {
        let bounds = DateBounds {
            start_date: Some(date(2024, 1, 5)),
            end_date: None,
        };
        assert_eq!(resolve_request_window(bounds, date(2024, 6, 1)), bounds);

        let filled = resolve_request_window(DateBounds::default(), date(2024, 6, 12));
        assert_eq!(filled.start_date, Some(date(2024, 6, 11)));
        assert_eq!(filled.end_date, Some(date(2024, 6, 20)));
    }

    #[test]
    fn test_bounds_cover_whole_ist_days() {
        let bounds = DateBounds {
            start_date: Some(date(2024, 6, 11)),
            end_date: Some(date(2024, 6, 20)),
        };
        let (start, end) = bounds_to_instants(bounds, ist());

        assert_eq!(start, Some(Utc.with_ymd_and_hms(2024, 6, 10, 18, 30, 0).unwrap()));
        assert_eq!(end, Some(Utc.with_ymd_and_hms(2024, 6, 20, 18, 30, 0).unwrap()));
    }

    #[test]
    fn test_local_date_crosses_midnight() {
        let late_utc = Utc.with_ymd_and_hms(2024, 6, 10, 19, 0, 0).unwrap();
        assert_eq!(local_date(late_utc, ist()), date(2024, 6, 11));
    }

    #[test]
    fn test_retention_cutoff_months() {
        let now = Utc.with_ymd_and_hms(2025, 3, 31, 2, 0, 0).unwrap();
        assert_eq!(
            retention_cutoff(now, 12),
            Utc.with_ymd_and_hms(2024, 3, 31, 2, 0, 0).unwrap()
        );
        // clamps to the end of a shorter month
        assert_eq!(
            retention_cutoff(now, 1),
            Utc.with_ymd_and_hms(2025, 2, 28, 2, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_next_daily_run() {
        // 2024-06-10 01:00 IST
        let before = Utc.with_ymd_and_hms(2024, 6, 9, 19, 30, 0).unwrap();
        assert_eq!(
            next_daily_run(before, 2, ist()),
            Utc.with_ymd_and_hms(2024, 6, 9, 20, 30, 0).unwrap()
        );

        // 2024-06-10 03:00 IST, already past today's run
        let after = Utc.with_ymd_and_hms(2024, 6, 9, 21, 30, 0).unwrap();
        assert_eq!(
            next_daily_run(after, 2, ist()),
            Utc.with_ymd_and_hms(2024, 6, 10, 20, 30, 0).unwrap()
        );
    }
}
