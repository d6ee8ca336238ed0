use crate::models::DateWindow;
use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime};

/// Monday-to-Sunday window of the week before the one containing `now`
pub fn compute_last_week_window(now: NaiveDateTime) -> DateWindow {
    let days_since_monday = now.weekday().num_days_from_monday() as i64;
    let this_monday = now.date() - Duration::days(days_since_monday);

    let last_monday = this_monday - Duration::days(7);
    let start = last_monday.and_time(NaiveTime::MIN);
    // Sunday 23:59:59.999999
    let end = start + Duration::days(7) - Duration::microseconds(1);

    DateWindow { start, end }
}

/// Window for a run pretended to happen on `date`
pub fn last_week_window_from_date(date: NaiveDate) -> DateWindow {
    compute_last_week_window(date.and_time(NaiveTime::MIN))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Timelike, Weekday};

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, s)
            .unwrap()
    }

    #[test]
    fn window_is_previous_monday_to_sunday() {
        // Wednesday 13 March 2024
        let window = compute_last_week_window(at(2024, 3, 13, 15, 42, 7));
        assert_eq!(window.start, at(2024, 3, 4, 0, 0, 0));
        assert_eq!(window.end.date(), NaiveDate::from_ymd_opt(2024, 3, 10).unwrap());
        assert_eq!(window.end.time().hour(), 23);
        assert_eq!(window.end.time().minute(), 59);
        assert_eq!(window.end.time().second(), 59);
        assert_eq!(window.end.time().nanosecond(), 999_999_000);
    }

    #[test]
    fn monday_midnight_still_yields_previous_week() {
        let window = compute_last_week_window(at(2024, 3, 11, 0, 0, 0));
        assert_eq!(window.start, at(2024, 3, 4, 0, 0, 0));
        assert_eq!(window.end.date(), NaiveDate::from_ymd_opt(2024, 3, 10).unwrap());
    }

    #[test]
    fn sunday_late_night_belongs_to_same_week() {
        let sunday = NaiveDate::from_ymd_opt(2024, 3, 17)
            .unwrap()
            .and_hms_micro_opt(23, 59, 59, 999_999)
            .unwrap();
        let window = compute_last_week_window(sunday);
        assert_eq!(window.start, at(2024, 3, 4, 0, 0, 0));
    }

    #[test]
    fn same_output_for_every_moment_in_a_week() {
        let expected = compute_last_week_window(at(2024, 3, 11, 0, 0, 0));
        for day in 11..=17 {
            for hour in [0, 6, 12, 23] {
                assert_eq!(compute_last_week_window(at(2024, 3, day, hour, 30, 0)), expected);
            }
        }
    }

    #[test]
    fn start_is_monday_and_span_is_fixed_across_year_boundaries() {
        let mut date = NaiveDate::from_ymd_opt(2023, 12, 20).unwrap();
        for _ in 0..40 {
            let window = last_week_window_from_date(date);
            assert_eq!(window.start.weekday(), Weekday::Mon);
            assert_eq!(window.end.weekday(), Weekday::Sun);
            assert_eq!(window.start.time(), NaiveTime::MIN);
            assert_eq!(
                window.end - window.start,
                Duration::days(7) - Duration::microseconds(1)
            );

            let this_monday = date - Duration::days(date.weekday().num_days_from_monday() as i64);
            assert_eq!(this_monday - window.start.date(), Duration::days(7));

            date += Duration::days(1);
        }
    }

    #[test]
    fn window_across_new_year() {
        // Tuesday 2 January 2024
        let window = last_week_window_from_date(NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
        assert_eq!(window.start, at(2023, 12, 25, 0, 0, 0));
        assert_eq!(window.end.date(), NaiveDate::from_ymd_opt(2023, 12, 31).unwrap());
    }
}
