//! Date values for calendar events.
//!
//! This module parses the three ICS date-time encodings into zoned
//! timestamps and provides [`TimeWindow`], the inclusive range used for
//! range filtering and recurrence expansion.
//!
//! All timestamps are `DateTime<Tz>` in a single display zone supplied by the
//! caller. Date-only and floating values are read as wall-clock times in that
//! zone; UTC values are converted into it.

use chrono::{DateTime, Duration, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Timelike, Utc};
use chrono_tz::Tz;

/// Shape of an ICS date value, recognized by length and character class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum IcsDateShape {
    /// `YYYYMMDD`
    Date,
    /// `YYYYMMDDTHHMMSSZ`
    Utc,
    /// `YYYYMMDDTHHMMSS`
    Floating,
}

impl IcsDateShape {
    fn of(value: &str) -> Option<Self> {
        let bytes = value.as_bytes();
        let digits = |range: std::ops::Range<usize>| bytes[range].iter().all(u8::is_ascii_digit);

        match bytes.len() {
            8 if digits(0..8) => Some(Self::Date),
            15 if digits(0..8) && bytes[8] == b'T' && digits(9..15) => Some(Self::Floating),
            16 if digits(0..8) && bytes[8] == b'T' && digits(9..15) && bytes[15] == b'Z' => {
                Some(Self::Utc)
            }
            _ => None,
        }
    }
}

/// Parses an ICS date value into a timestamp in `zone`.
///
/// Recognized shapes:
/// - `20250615` (date only, local midnight)
/// - `20250615T100000Z` (UTC, converted to `zone`)
/// - `20250615T100000` (floating, read as wall-clock time in `zone`)
///
/// Anything else, including digit-shaped values that are not real calendar
/// dates, yields `None`.
pub fn parse_ics_date(raw: Option<&str>, zone: Tz) -> Option<DateTime<Tz>> {
    let value = raw?;

    match IcsDateShape::of(value)? {
        IcsDateShape::Date => {
            let date = parse_date_digits(&value[0..8])?;
            resolve_local(zone, date.and_time(NaiveTime::MIN))
        }
        IcsDateShape::Floating => {
            let naive = parse_date_digits(&value[0..8])?.and_time(parse_time_digits(&value[9..15])?);
            resolve_local(zone, naive)
        }
        IcsDateShape::Utc => {
            let naive = parse_date_digits(&value[0..8])?.and_time(parse_time_digits(&value[9..15])?);
            Some(Utc.from_utc_datetime(&naive).with_timezone(&zone))
        }
    }
}

fn parse_date_digits(digits: &str) -> Option<NaiveDate> {
    let year = digits[0..4].parse().ok()?;
    let month = digits[4..6].parse().ok()?;
    let day = digits[6..8].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

fn parse_time_digits(digits: &str) -> Option<NaiveTime> {
    let hour = digits[0..2].parse().ok()?;
    let minute = digits[2..4].parse().ok()?;
    let second = digits[4..6].parse().ok()?;
    NaiveTime::from_hms_opt(hour, minute, second)
}

/// Resolves a wall-clock time in `zone`.
///
/// Ambiguous times (DST fold) take the earlier instant. Times inside a DST
/// gap are moved forward one hour.
pub fn resolve_local(zone: Tz, naive: NaiveDateTime) -> Option<DateTime<Tz>> {
    match zone.from_local_datetime(&naive) {
        LocalResult::Single(dt) => Some(dt),
        LocalResult::Ambiguous(earliest, _) => Some(earliest),
        LocalResult::None => zone
            .from_local_datetime(&naive.checked_add_signed(Duration::hours(1))?)
            .earliest(),
    }
}

/// Formats a timestamp as an ICS UTC value (`YYYYMMDDTHHMMSSZ`).
pub fn format_ics_utc<T: TimeZone>(dt: &DateTime<T>) -> String {
    dt.with_timezone(&Utc).format("%Y%m%dT%H%M%SZ").to_string()
}

/// Returns true if the timestamp sits exactly at local midnight.
pub fn is_local_midnight(dt: &DateTime<Tz>) -> bool {
    dt.hour() == 0 && dt.minute() == 0 && dt.second() == 0
}

/// Canonical per-second key used to compare timestamps for equality.
pub fn second_key(dt: &DateTime<Tz>) -> i64 {
    dt.timestamp()
}

/// An inclusive time range `[start, end]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeWindow {
    /// Start of the window (inclusive).
    pub start: DateTime<Tz>,
    /// End of the window (inclusive).
    pub end: DateTime<Tz>,
}

impl TimeWindow {
    /// Creates a new time window.
    pub fn new(start: DateTime<Tz>, end: DateTime<Tz>) -> Self {
        Self { start, end }
    }

    /// The calendar year in `zone`: Jan 1 00:00:00 through Dec 31 23:59:59.
    pub fn for_year(year: i32, zone: Tz) -> Option<Self> {
        let start = NaiveDate::from_ymd_opt(year, 1, 1)?.and_time(NaiveTime::MIN);
        let end = NaiveDate::from_ymd_opt(year, 12, 31)?.and_hms_opt(23, 59, 59)?;
        Some(Self {
            start: resolve_local(zone, start)?,
            end: resolve_local(zone, end)?,
        })
    }

    /// From the first day of `month` through the end of the same year.
    pub fn rest_of_year(year: i32, month: u32, zone: Tz) -> Option<Self> {
        let start = NaiveDate::from_ymd_opt(year, month, 1)?.and_time(NaiveTime::MIN);
        let year_window = Self::for_year(year, zone)?;
        Some(Self {
            start: resolve_local(zone, start)?,
            end: year_window.end,
        })
    }

    /// Checks if a timestamp falls within this window, bounds included.
    pub fn contains<T: TimeZone>(&self, dt: &DateTime<T>) -> bool {
        self.start <= *dt && *dt <= self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;
    use chrono_tz::{America::New_York, Europe::Madrid, UTC};

    fn local(zone: Tz, y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<Tz> {
        zone.with_ymd_and_hms(y, m, d, h, min, s).unwrap()
    }

    mod parse {
        use super::*;

        #[test]
        fn date_only_is_local_midnight() {
            let dt = parse_ics_date(Some("20250615"), Madrid).unwrap();
            assert_eq!(dt, local(Madrid, 2025, 6, 15, 0, 0, 0));
            assert!(is_local_midnight(&dt));
        }

        #[test]
        fn utc_is_converted_to_zone() {
            let dt = parse_ics_date(Some("20250615T100000Z"), Madrid).unwrap();
            // CEST is UTC+2
            assert_eq!(dt, local(Madrid, 2025, 6, 15, 12, 0, 0));
            assert_eq!(dt.timezone(), Madrid);
        }

        #[test]
        fn floating_is_wall_clock_in_zone() {
            let dt = parse_ics_date(Some("20250615T100000"), New_York).unwrap();
            assert_eq!(dt, local(New_York, 2025, 6, 15, 10, 0, 0));
        }

        #[test]
        fn unsupported_shapes_yield_none() {
            for raw in [
                "",
                "2025-06-15",
                "20250615T1000",
                "20250615T100000.5Z",
                "2025W241",
                "20250615 100000",
                "20250615T100000+0200",
                "2025061",
                "abcdefgh",
            ] {
                assert!(parse_ics_date(Some(raw), UTC).is_none(), "{raw} should not parse");
            }
            assert!(parse_ics_date(None, UTC).is_none());
        }

        #[test]
        fn impossible_calendar_values_yield_none() {
            assert!(parse_ics_date(Some("20251301"), UTC).is_none());
            assert!(parse_ics_date(Some("20250230"), UTC).is_none());
            assert!(parse_ics_date(Some("20250615T250000"), UTC).is_none());
            assert!(parse_ics_date(Some("20250615T106000Z"), UTC).is_none());
        }

        #[test]
        fn dst_gap_moves_forward() {
            // 2025-03-30 02:30 does not exist in Madrid.
            let dt = parse_ics_date(Some("20250330T023000"), Madrid).unwrap();
            assert_eq!(dt.hour(), 3);
            assert_eq!(dt.minute(), 30);
        }

        #[test]
        fn dst_fold_takes_earlier_instant() {
            // 2025-10-26 02:30 occurs twice in Madrid.
            let dt = parse_ics_date(Some("20251026T023000"), Madrid).unwrap();
            assert_eq!(format_ics_utc(&dt), "20251026T003000Z");
        }
    }

    mod window {
        use super::*;

        #[test]
        fn year_bounds() {
            let window = TimeWindow::for_year(2025, Madrid).unwrap();
            assert_eq!(window.start, local(Madrid, 2025, 1, 1, 0, 0, 0));
            assert_eq!(window.end, local(Madrid, 2025, 12, 31, 23, 59, 59));
        }

        #[test]
        fn contains_is_inclusive() {
            let window = TimeWindow::for_year(2025, UTC).unwrap();
            assert!(window.contains(&local(UTC, 2025, 1, 1, 0, 0, 0)));
            assert!(window.contains(&local(UTC, 2025, 12, 31, 23, 59, 59)));
            assert!(!window.contains(&local(UTC, 2024, 12, 31, 23, 59, 59)));
            assert!(!window.contains(&local(UTC, 2026, 1, 1, 0, 0, 0)));
        }

        #[test]
        fn contains_compares_instants_across_zones() {
            let window = TimeWindow::for_year(2025, Madrid).unwrap();
            // 2024-12-31 23:30 UTC is already 2025 in Madrid.
            let instant = Utc.with_ymd_and_hms(2024, 12, 31, 23, 30, 0).unwrap();
            assert!(window.contains(&instant));
        }

        #[test]
        fn rest_of_year_starts_on_first_of_month() {
            let window = TimeWindow::rest_of_year(2025, 10, UTC).unwrap();
            assert_eq!(window.start.month(), 10);
            assert_eq!(window.start.day(), 1);
            assert_eq!(window.end, local(UTC, 2025, 12, 31, 23, 59, 59));
        }

        #[test]
        fn invalid_month_yields_none() {
            assert!(TimeWindow::rest_of_year(2025, 13, UTC).is_none());
        }
    }

    #[test]
    fn format_utc_stamp() {
        let dt = local(Madrid, 2025, 1, 15, 10, 0, 0);
        assert_eq!(format_ics_utc(&dt), "20250115T090000Z");
    }

    #[test]
    fn second_key_matches_unix_timestamp() {
        let dt = local(UTC, 1970, 1, 1, 0, 1, 0);
        assert_eq!(second_key(&dt), 60);
    }
}
