//! Cache payload for parsed event lists.
//!
//! A [`CachePayload`] stores parsed events as flat rows of strings and Unix
//! timestamps so a cache can rehydrate [`Event`] values without re-parsing
//! ICS text. Payloads carry a schema version; a payload written under a
//! different version is rejected as a miss.

use chrono::{DateTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::event::Event;

/// Current schema version of [`CachePayload`].
pub const CACHE_SCHEMA_VERSION: u32 = 1;

/// One flattened event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRow {
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub uid: String,
    #[serde(default)]
    pub rrule: String,
    /// Start as Unix seconds.
    pub start_ts: i64,
    /// End as Unix seconds, if the event has one.
    pub end_ts: Option<i64>,
    #[serde(default)]
    pub exdate_ts: Vec<i64>,
    #[serde(default)]
    pub rdate_ts: Vec<i64>,
}

impl EventRow {
    /// Flattens an event.
    pub fn from_event(event: &Event) -> Self {
        Self {
            summary: event.summary.clone(),
            description: event.description.clone(),
            location: event.location.clone(),
            url: event.url.clone(),
            uid: event.uid.clone(),
            rrule: event.rrule.clone(),
            start_ts: event.start.timestamp(),
            end_ts: event.end.map(|end| end.timestamp()),
            exdate_ts: event.exdate.iter().map(DateTime::timestamp).collect(),
            rdate_ts: event.rdate.iter().map(DateTime::timestamp).collect(),
        }
    }

    /// Rebuilds the event in `zone`.
    ///
    /// Returns `None` if any timestamp is outside the representable range.
    pub fn to_event(&self, zone: Tz) -> Option<Event> {
        let end = match self.end_ts {
            Some(ts) => Some(from_timestamp(ts, zone)?),
            None => None,
        };

        Some(
            Event::new(from_timestamp(self.start_ts, zone)?)
                .with_summary(&self.summary)
                .with_description(&self.description)
                .with_location(&self.location)
                .with_url(&self.url)
                .with_end(end)
                .with_uid(&self.uid)
                .with_rrule(&self.rrule)
                .with_exdate(from_timestamps(&self.exdate_ts, zone)?)
                .with_rdate(from_timestamps(&self.rdate_ts, zone)?),
        )
    }
}

fn from_timestamp(ts: i64, zone: Tz) -> Option<DateTime<Tz>> {
    Utc.timestamp_opt(ts, 0)
        .single()
        .map(|dt| dt.with_timezone(&zone))
}

fn from_timestamps(timestamps: &[i64], zone: Tz) -> Option<Vec<DateTime<Tz>>> {
    timestamps.iter().map(|ts| from_timestamp(*ts, zone)).collect()
}

/// The cached form of a parsed event list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachePayload {
    /// Schema version the payload was written with.
    pub schema_version: u32,
    /// Unix seconds at which the payload was built.
    pub validated_at: i64,
    /// Flattened events.
    pub events: Vec<EventRow>,
}

impl CachePayload {
    /// Builds a payload for `events` stamped with `now`.
    pub fn from_events<T: TimeZone>(events: &[Event], now: DateTime<T>) -> Self {
        Self {
            schema_version: CACHE_SCHEMA_VERSION,
            validated_at: now.timestamp(),
            events: events.iter().map(EventRow::from_event).collect(),
        }
    }

    /// Rehydrates the events in `zone`.
    ///
    /// Returns `None` when the schema version does not match or any row is
    /// unusable; callers treat that as a cache miss.
    pub fn into_events(self, zone: Tz) -> Option<Vec<Event>> {
        if self.schema_version != CACHE_SCHEMA_VERSION {
            return None;
        }

        self.events.iter().map(|row| row.to_event(zone)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::Europe::Madrid;

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Tz> {
        Madrid.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    fn sample_event() -> Event {
        Event::new(at(2025, 6, 15, 10))
            .with_summary("Concert")
            .with_description("Line one\nLine two")
            .with_location("Plaza Mayor")
            .with_url("https://example.com/concert")
            .with_end(Some(at(2025, 6, 15, 12)))
            .with_uid("concert-1@example.com")
            .with_rrule("FREQ=YEARLY")
            .with_exdate(vec![at(2026, 6, 15, 10)])
            .with_rdate(vec![at(2025, 9, 1, 10), at(2025, 10, 1, 10)])
    }

    #[test]
    fn payload_rehydrates_events() {
        let events = vec![sample_event(), Event::new(at(2025, 1, 1, 0))];
        let payload = CachePayload::from_events(&events, Utc::now());

        let json = serde_json::to_string(&payload).unwrap();
        let parsed: CachePayload = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.into_events(Madrid), Some(events));
    }

    #[test]
    fn schema_mismatch_is_a_miss() {
        let mut payload = CachePayload::from_events(&[sample_event()], Utc::now());
        payload.schema_version = CACHE_SCHEMA_VERSION + 1;
        assert_eq!(payload.into_events(Madrid), None);
    }

    #[test]
    fn row_shape() {
        let row = EventRow::from_event(&sample_event());
        insta::assert_json_snapshot!(row, @r#"
        {
          "summary": "Concert",
          "description": "Line one\nLine two",
          "location": "Plaza Mayor",
          "url": "https://example.com/concert",
          "uid": "concert-1@example.com",
          "rrule": "FREQ=YEARLY",
          "start_ts": 1749974400,
          "end_ts": 1749981600,
          "exdate_ts": [
            1781510400
          ],
          "rdate_ts": [
            1756713600,
            1759305600
          ]
        }
        "#);
    }

    #[test]
    fn rows_without_optional_fields_deserialize() {
        let json = r#"{"schema_version":1,"validated_at":0,"events":[{"start_ts":0,"end_ts":null}]}"#;
        let payload: CachePayload = serde_json::from_str(json).unwrap();
        let events = payload.into_events(Madrid).unwrap();
        assert_eq!(events.len(), 1);
        assert!(events[0].summary.is_empty());
        assert!(events[0].end.is_none());
    }

    #[test]
    fn validated_at_uses_supplied_now() {
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let payload = CachePayload::from_events(&[], now);
        assert_eq!(payload.validated_at, 1_735_689_600);
        assert_eq!(payload.schema_version, CACHE_SCHEMA_VERSION);
    }
}
