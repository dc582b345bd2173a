//! VEVENT record parsing.
//!
//! The parser scans unfolded lines for `BEGIN:VEVENT` / `END:VEVENT` blocks
//! and collects a closed set of properties per block into an [`Event`].
//! Everything it does not understand is skipped: unknown properties, lines
//! without a colon, unparseable dates and events without a usable DTSTART.

use calfeed_core::event::Event;
use calfeed_core::time::parse_ics_date;
use chrono::DateTime;
use chrono_tz::Tz;
use tracing::{debug, trace};

use crate::text::decode_text;
use crate::unfold::unfold;

/// Optional inclusive bounds on event start times.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RangeFilter {
    /// Earliest accepted start, if bounded.
    pub start: Option<DateTime<Tz>>,
    /// Latest accepted start, if bounded.
    pub end: Option<DateTime<Tz>>,
}

impl RangeFilter {
    /// A filter that accepts every start.
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Creates a filter with the given bounds.
    pub fn new(start: Option<DateTime<Tz>>, end: Option<DateTime<Tz>>) -> Self {
        Self { start, end }
    }

    /// Returns true if `dt` satisfies every bound that is set.
    pub fn contains(&self, dt: &DateTime<Tz>) -> bool {
        self.start.as_ref().is_none_or(|start| dt >= start)
            && self.end.as_ref().is_none_or(|end| dt <= end)
    }
}

/// The VEVENT properties the parser keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Property {
    Summary,
    Description,
    Location,
    Url,
    Uid,
    Rrule,
    DtStart,
    DtEnd,
    ExDate,
    RDate,
}

impl Property {
    fn from_key(key: &str) -> Option<Self> {
        match key {
            "SUMMARY" => Some(Self::Summary),
            "DESCRIPTION" => Some(Self::Description),
            "LOCATION" => Some(Self::Location),
            "URL" => Some(Self::Url),
            "UID" => Some(Self::Uid),
            "RRULE" => Some(Self::Rrule),
            "DTSTART" => Some(Self::DtStart),
            "DTEND" => Some(Self::DtEnd),
            "EXDATE" => Some(Self::ExDate),
            "RDATE" => Some(Self::RDate),
            _ => None,
        }
    }
}

/// Property values collected for the VEVENT being scanned.
#[derive(Debug, Default)]
struct EventAccumulator {
    summary: String,
    description: String,
    location: String,
    url: String,
    uid: String,
    rrule: String,
    dtstart: Option<String>,
    dtend: Option<String>,
    exdate: Vec<String>,
    rdate: Vec<String>,
}

impl EventAccumulator {
    fn set(&mut self, property: Property, value: String) {
        match property {
            Property::Summary => self.summary = value,
            Property::Description => self.description = value,
            Property::Location => self.location = value,
            Property::Url => self.url = value,
            Property::Uid => self.uid = value,
            Property::Rrule => self.rrule = value,
            Property::DtStart => self.dtstart = Some(value),
            Property::DtEnd => self.dtend = Some(value),
            Property::ExDate => self.exdate.push(value),
            Property::RDate => self.rdate.push(value),
        }
    }

    fn build(self, zone: Tz, range: &RangeFilter) -> Option<Event> {
        let Some(start) = parse_ics_date(self.dtstart.as_deref(), zone) else {
            debug!(uid = %self.uid, dtstart = ?self.dtstart, "Dropping event without usable DTSTART");
            return None;
        };

        if !range.contains(&start) {
            trace!(uid = %self.uid, start = %start, "Event start outside range");
            return None;
        }

        Some(
            Event::new(start)
                .with_summary(self.summary)
                .with_description(self.description)
                .with_location(self.location)
                .with_url(self.url)
                .with_end(parse_ics_date(self.dtend.as_deref(), zone))
                .with_uid(self.uid)
                .with_rrule(self.rrule)
                .with_exdate(parse_date_list(&self.exdate, zone))
                .with_rdate(parse_date_list(&self.rdate, zone)),
        )
    }
}

/// Parses comma-separated date values from one or more property lines.
///
/// Items are trimmed; empty and unparseable items are dropped.
pub fn parse_date_list<S: AsRef<str>>(values: &[S], zone: Tz) -> Vec<DateTime<Tz>> {
    values
        .iter()
        .flat_map(|value| value.as_ref().split(','))
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .filter_map(|item| {
            let parsed = parse_ics_date(Some(item), zone);
            if parsed.is_none() {
                trace!(item, "Skipping unparseable date list item");
            }
            parsed
        })
        .collect()
}

/// Splits a content line into its property key and decoded value.
///
/// Returns `None` for lines without a colon.
fn split_property(line: &str) -> Option<(String, String)> {
    let (name, value) = line.split_once(':')?;
    let key = name.split(';').next().unwrap_or(name).trim().to_ascii_uppercase();
    Some((key, decode_text(value.trim())))
}

/// Parses events from unfolded lines.
///
/// Events whose start falls outside `range` are dropped. The result is sorted
/// by start.
pub fn parse_events<S: AsRef<str>>(lines: &[S], zone: Tz, range: &RangeFilter) -> Vec<Event> {
    let mut events = Vec::new();
    let mut current: Option<EventAccumulator> = None;

    for line in lines {
        let line = line.as_ref();
        match line.trim() {
            "BEGIN:VEVENT" => {
                current = Some(EventAccumulator::default());
                continue;
            }
            "END:VEVENT" => {
                if let Some(event) = current.take().and_then(|acc| acc.build(zone, range)) {
                    events.push(event);
                }
                continue;
            }
            _ => {}
        }

        let Some(acc) = current.as_mut() else {
            continue;
        };

        let Some((key, value)) = split_property(line) else {
            trace!(line, "Ignoring line without a colon");
            continue;
        };

        if let Some(property) = Property::from_key(&key) {
            acc.set(property, value);
        }
    }

    events.sort_by(|a, b| a.start.cmp(&b.start));
    events
}

/// Unfolds and parses a raw ICS document.
pub fn parse_ics(raw: &str, zone: Tz, range: &RangeFilter) -> Vec<Event> {
    let events = parse_events(&unfold(raw), zone, range);
    debug!(count = events.len(), "Parsed ICS feed");
    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono_tz::Europe::Madrid;
    use chrono_tz::UTC;

    fn at(zone: Tz, y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Tz> {
        zone.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    const SINGLE_EVENT: &str = "BEGIN:VCALENDAR\r\n\
VERSION:2.0\r\n\
BEGIN:VEVENT\r\n\
UID:abc@example.com\r\n\
SUMMARY:Team\\, sync\r\n\
DESCRIPTION:Line one\\nLine two\r\n\
LOCATION:Room 4\r\n\
URL:https://example.com/e/1\r\n\
DTSTART:20250615T100000Z\r\n\
DTEND:20250615T110000Z\r\n\
END:VEVENT\r\n\
END:VCALENDAR\r\n";

    mod single {
        use super::*;

        #[test]
        fn parses_all_fields() {
            let events = parse_ics(SINGLE_EVENT, Madrid, &RangeFilter::unbounded());
            assert_eq!(events.len(), 1);

            let event = &events[0];
            assert_eq!(event.uid, "abc@example.com");
            assert_eq!(event.summary, "Team, sync");
            assert_eq!(event.description, "Line one\nLine two");
            assert_eq!(event.location, "Room 4");
            assert_eq!(event.url, "https://example.com/e/1");
            assert_eq!(event.start, at(Madrid, 2025, 6, 15, 12, 0));
            assert_eq!(event.end, Some(at(Madrid, 2025, 6, 15, 13, 0)));
            assert!(!event.is_recurring());
            assert!(event.exdate.is_empty());
        }

        #[test]
        fn property_parameters_are_ignored() {
            let ics = "BEGIN:VEVENT\n\
DTSTART;TZID=Europe/Madrid:20250615T100000\n\
summary;LANGUAGE=es:Reunión\n\
END:VEVENT";
            let events = parse_ics(ics, Madrid, &RangeFilter::unbounded());
            assert_eq!(events.len(), 1);
            assert_eq!(events[0].summary, "Reunión");
            assert_eq!(events[0].start, at(Madrid, 2025, 6, 15, 10, 0));
        }

        #[test]
        fn value_keeps_later_colons() {
            let ics = "BEGIN:VEVENT\nDTSTART:20250615\nURL:https://example.com:8443/x\nEND:VEVENT";
            let events = parse_ics(ics, UTC, &RangeFilter::unbounded());
            assert_eq!(events[0].url, "https://example.com:8443/x");
        }

        #[test]
        fn folded_summary_is_joined() {
            let ics = "BEGIN:VEVENT\nDTSTART:20250615\nSUMMARY:Hello\n World\nEND:VEVENT";
            let events = parse_ics(ics, UTC, &RangeFilter::unbounded());
            assert_eq!(events[0].summary, "HelloWorld");
        }

        #[test]
        fn last_value_wins() {
            let ics = "BEGIN:VEVENT\nDTSTART:20250615\nSUMMARY:first\nSUMMARY:second\nEND:VEVENT";
            let events = parse_ics(ics, UTC, &RangeFilter::unbounded());
            assert_eq!(events[0].summary, "second");
        }
    }

    mod discard {
        use super::*;

        #[test]
        fn missing_or_bad_dtstart_drops_event() {
            let ics = "BEGIN:VEVENT\nSUMMARY:no start\nEND:VEVENT\n\
BEGIN:VEVENT\nSUMMARY:bad start\nDTSTART:2025-06-15\nEND:VEVENT\n\
BEGIN:VEVENT\nSUMMARY:ok\nDTSTART:20250615\nEND:VEVENT";
            let events = parse_ics(ics, UTC, &RangeFilter::unbounded());
            assert_eq!(events.len(), 1);
            assert_eq!(events[0].summary, "ok");
        }

        #[test]
        fn range_bounds_are_inclusive_and_independent() {
            let ics = "BEGIN:VEVENT\nUID:a\nDTSTART:20250101\nEND:VEVENT\n\
BEGIN:VEVENT\nUID:b\nDTSTART:20250601\nEND:VEVENT\n\
BEGIN:VEVENT\nUID:c\nDTSTART:20251231\nEND:VEVENT";
            let lines = unfold(ics);

            let uids = |range: RangeFilter| -> Vec<String> {
                parse_events(&lines, UTC, &range)
                    .into_iter()
                    .map(|e| e.uid)
                    .collect()
            };

            let june = at(UTC, 2025, 6, 1, 0, 0);
            assert_eq!(uids(RangeFilter::new(Some(june), None)), vec!["b", "c"]);
            assert_eq!(uids(RangeFilter::new(None, Some(june))), vec!["a", "b"]);
            assert_eq!(uids(RangeFilter::new(Some(june), Some(june))), vec!["b"]);
            assert_eq!(uids(RangeFilter::unbounded()), vec!["a", "b", "c"]);
        }

        #[test]
        fn lines_outside_blocks_and_unknown_keys_are_ignored() {
            let ics = "SUMMARY:outside\nBEGIN:VEVENT\nDTSTART:20250615\nX-CUSTOM:foo\n\
no colon here\nEND:VEVENT\nSUMMARY:after";
            let events = parse_ics(ics, UTC, &RangeFilter::unbounded());
            assert_eq!(events.len(), 1);
            assert!(events[0].summary.is_empty());
        }

        #[test]
        fn begin_resets_an_unterminated_block() {
            let ics = "BEGIN:VEVENT\nSUMMARY:lost\nBEGIN:VEVENT\nDTSTART:20250615\nEND:VEVENT";
            let events = parse_ics(ics, UTC, &RangeFilter::unbounded());
            assert_eq!(events.len(), 1);
            assert!(events[0].summary.is_empty());
        }
    }

    mod dates {
        use super::*;

        #[test]
        fn exdate_and_rdate_accumulate_across_lines() {
            let ics = "BEGIN:VEVENT\n\
DTSTART:20250106T090000\n\
RRULE:FREQ=WEEKLY\n\
EXDATE:20250113T090000,20250120T090000\n\
EXDATE: 20250127T090000 ,,garbage\n\
RDATE:20250108T090000\n\
END:VEVENT";
            let events = parse_ics(ics, UTC, &RangeFilter::unbounded());
            let event = &events[0];

            assert_eq!(event.rrule, "FREQ=WEEKLY");
            assert_eq!(
                event.exdate,
                vec![
                    at(UTC, 2025, 1, 13, 9, 0),
                    at(UTC, 2025, 1, 20, 9, 0),
                    at(UTC, 2025, 1, 27, 9, 0),
                ]
            );
            assert_eq!(event.rdate, vec![at(UTC, 2025, 1, 8, 9, 0)]);
        }

        #[test]
        fn unparseable_dtend_is_absent() {
            let ics = "BEGIN:VEVENT\nDTSTART:20250615\nDTEND:soon\nEND:VEVENT";
            let events = parse_ics(ics, UTC, &RangeFilter::unbounded());
            assert!(events[0].end.is_none());
        }
    }

    #[test]
    fn output_is_sorted_by_start() {
        let ics = "BEGIN:VEVENT\nUID:late\nDTSTART:20251201\nEND:VEVENT\n\
BEGIN:VEVENT\nUID:early\nDTSTART:20250101\nEND:VEVENT";
        let events = parse_ics(ics, UTC, &RangeFilter::unbounded());
        let uids: Vec<_> = events.iter().map(|e| e.uid.as_str()).collect();
        assert_eq!(uids, vec!["early", "late"]);
    }

    #[test]
    fn parsing_is_idempotent() {
        let lines = unfold(SINGLE_EVENT);
        let first = parse_events(&lines, Madrid, &RangeFilter::unbounded());
        let second = parse_events(&lines, Madrid, &RangeFilter::unbounded());
        assert_eq!(first, second);
    }
}
