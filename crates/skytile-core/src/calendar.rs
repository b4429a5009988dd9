//! Local calendar derivation from provider UTC offsets
//!
//! The weather provider reports a signed offset in seconds for the queried
//! coordinate. A "local" date is the calendar date of the UTC instant
//! shifted by that offset; the device clock itself stays in UTC and no
//! timezone database is involved.

use chrono::{DateTime, Datelike, NaiveDate, Weekday};

use crate::types::{Timestamp, UtcOffset};

const SECONDS_PER_DAY: i64 = 86_400;

/// Calendar date at the queried location for a UTC timestamp
pub fn local_date(ts: Timestamp, offset: UtcOffset) -> NaiveDate {
    let shifted = ts.saturating_add(offset);
    DateTime::from_timestamp(shifted, 0)
        .unwrap_or_default()
        .date_naive()
}

/// Seconds since local midnight, always in 0..86400
pub fn local_seconds_of_day(ts: Timestamp, offset: UtcOffset) -> i64 {
    ts.saturating_add(offset).rem_euclid(SECONDS_PER_DAY)
}

/// Three-letter day name for a calendar date
pub fn day_name(date: NaiveDate) -> &'static str {
    match date.weekday() {
        Weekday::Sun => "Sun",
        Weekday::Mon => "Mon",
        Weekday::Tue => "Tue",
        Weekday::Wed => "Wed",
        Weekday::Thu => "Thu",
        Weekday::Fri => "Fri",
        Weekday::Sat => "Sat",
    }
}

/// Zero-padded "MM-DD" for the panel tiles
pub fn display_date(date: NaiveDate) -> String {
    format!("{:02}-{:02}", date.month(), date.day())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(y: i32, m: u32, d: u32, h: u32) -> Timestamp {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
            .and_utc()
            .timestamp()
    }

    #[test]
    fn test_negative_offset_keeps_same_date() {
        // 2024-06-01T23:00Z at UTC-7 is 16:00 local, still June 1st
        let t = ts(2024, 6, 1, 23);
        let date = local_date(t, -25_200);
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
        assert_eq!(local_seconds_of_day(t, -25_200), 16 * 3600);
    }

    #[test]
    fn test_positive_offset_rolls_date_forward() {
        let t = ts(2024, 6, 1, 23);
        let date = local_date(t, 7_200);
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 6, 2).unwrap());
    }

    #[test]
    fn test_negative_offset_rolls_date_backward() {
        let t = ts(2024, 6, 1, 1);
        let date = local_date(t, -7_200);
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 5, 31).unwrap());
        assert_eq!(local_seconds_of_day(t, -7_200), 23 * 3600);
    }

    #[test]
    fn test_day_names() {
        assert_eq!(day_name(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()), "Sat");
        assert_eq!(day_name(NaiveDate::from_ymd_opt(2024, 6, 2).unwrap()), "Sun");
        assert_eq!(day_name(NaiveDate::from_ymd_opt(2024, 6, 3).unwrap()), "Mon");
    }

    #[test]
    fn test_display_date_is_zero_padded() {
        assert_eq!(
            display_date(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()),
            "06-01"
        );
        assert_eq!(
            display_date(NaiveDate::from_ymd_opt(2024, 12, 25).unwrap()),
            "12-25"
        );
    }
}
