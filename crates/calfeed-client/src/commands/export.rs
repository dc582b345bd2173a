//! The `export` command: one occurrence as a standalone ICS document.

use calfeed_core::agenda::MonthsMode;
use calfeed_core::event::Event;
use calfeed_core::time::{parse_ics_date, second_key};
use calfeed_ics::export::export_event;
use calfeed_providers::IcsFetcher;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;

use super::events::AgendaPlan;
use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

/// Parses an occurrence start given as an ICS value or RFC 3339 into its
/// second key.
pub fn parse_start_selector(raw: &str, zone: Tz) -> ClientResult<i64> {
    let raw = raw.trim();
    parse_ics_date(Some(raw), zone)
        .map(|dt| second_key(&dt))
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.timestamp()))
        .ok_or_else(|| ClientError::InvalidArgument(format!("unrecognized start {raw:?}")))
}

/// Returns the occurrence carrying `uid` that starts at `start`, or the
/// earliest one when no start is given.
///
/// Occurrences are sorted by start, so the earliest is the first match.
pub fn find_occurrence<'a>(occurrences: &'a [Event], uid: &str, start: Option<i64>) -> ClientResult<&'a Event> {
    occurrences
        .iter()
        .filter(|event| event.uid == uid)
        .find(|event| start.is_none_or(|key| second_key(&event.start) == key))
        .ok_or_else(|| match start {
            Some(key) => ClientError::NotFound(format!("no occurrence of UID {uid:?} starting at {key}")),
            None => ClientError::NotFound(format!("no event with UID {uid:?}")),
        })
}

/// Options for the `export` command.
#[derive(Debug, Clone)]
pub struct ExportOptions {
    pub source: String,
    pub uid: String,
    pub start: Option<String>,
    pub year: Option<i32>,
}

/// Fetches the feed and prints the selected occurrence.
pub async fn run(config: &ClientConfig, options: ExportOptions) -> ClientResult<()> {
    let feed_config = config.feed.to_feed_config()?;
    let zone = feed_config.timezone;
    let start = options
        .start
        .as_deref()
        .map(|raw| parse_start_selector(raw, zone))
        .transpose()?;

    let now = Utc::now();
    let plan = AgendaPlan::new(&now.with_timezone(&zone), options.year, MonthsMode::All);

    let fetcher = IcsFetcher::from_config(feed_config)?;
    let events = fetcher.events_from_source(&options.source, &plan.range).await?;
    let occurrences = plan.occurrences(&events, zone);

    let event = find_occurrence(&occurrences, &options.uid, start)?;
    print!("{}", export_event(event, &now));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use calfeed_ics::materialize::expand_for_year;
    use chrono::TimeZone;
    use chrono_tz::Europe::Madrid;

    fn occurrences() -> Vec<Event> {
        let at = |d| Madrid.with_ymd_and_hms(2025, 3, d, 19, 0, 0).unwrap();
        vec![
            Event::new(at(3)).with_uid("club"),
            Event::new(at(5)).with_uid("talk"),
            Event::new(at(10)).with_uid("club"),
        ]
    }

    #[test]
    fn finds_earliest_occurrence() {
        let occurrences = occurrences();
        let found = find_occurrence(&occurrences, "club", None).unwrap();
        assert_eq!(found.start.format("%d").to_string(), "03");
    }

    #[test]
    fn missing_uid_is_not_found() {
        let err = find_occurrence(&occurrences(), "nope", None).unwrap_err();
        assert!(matches!(err, ClientError::NotFound(_)));
        assert_eq!(err.to_string(), "not found: no event with UID \"nope\"");
    }

    #[test]
    fn unknown_start_is_not_found() {
        let err = find_occurrence(&occurrences(), "club", Some(0)).unwrap_err();
        assert!(matches!(err, ClientError::NotFound(_)));
    }

    #[test]
    fn third_weekly_occurrence_exports() {
        let events = vec![
            Event::new(Madrid.with_ymd_and_hms(2025, 3, 3, 19, 0, 0).unwrap())
                .with_uid("club")
                .with_summary("Book club")
                .with_rrule("FREQ=WEEKLY;COUNT=5"),
        ];
        let occurrences = expand_for_year(&events, 2025, Madrid);

        let start = parse_start_selector("20250317T180000Z", Madrid).unwrap();
        let event = find_occurrence(&occurrences, "club", Some(start)).unwrap();
        assert_eq!(event.start, Madrid.with_ymd_and_hms(2025, 3, 17, 19, 0, 0).unwrap());

        let ics = export_event(event, &Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap());
        assert!(ics.contains("UID:club\r\n"));
        assert!(ics.contains("DTSTART:20250317T180000Z\r\n"));
    }

    mod selector {
        use super::*;

        #[test]
        fn accepts_ics_and_rfc3339() {
            let expected = Madrid.with_ymd_and_hms(2025, 3, 17, 19, 0, 0).unwrap().timestamp();
            assert_eq!(parse_start_selector("20250317T180000Z", Madrid).unwrap(), expected);
            assert_eq!(parse_start_selector("20250317T190000", Madrid).unwrap(), expected);
            assert_eq!(
                parse_start_selector("2025-03-17T19:00:00+01:00", Madrid).unwrap(),
                expected
            );
        }

        #[test]
        fn rejects_garbage() {
            let err = parse_start_selector("next tuesday", Madrid).unwrap_err();
            assert!(matches!(err, ClientError::InvalidArgument(_)));
        }
    }
}
