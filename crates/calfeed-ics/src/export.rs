//! Single-event ICS export.
//!
//! Builds a standalone VCALENDAR document for one occurrence so it can be
//! imported into another calendar.

use calfeed_core::event::Event;
use calfeed_core::links::effective_end;
use calfeed_core::time::format_ics_utc;
use chrono::{DateTime, TimeZone};

use crate::text::escape_text;

/// PRODID written into exported calendars.
pub const PRODID: &str = "-//calfeed//EN";

const UID_DOMAIN: &str = "calfeed";

/// Returns the UID to export for `event`.
///
/// Events without a UID get a stable one derived from the summary and start.
pub fn export_uid(event: &Event) -> String {
    if !event.uid.is_empty() {
        return event.uid.clone();
    }

    let seed = format!("{}|{}", event.summary, event.start.to_rfc3339());
    format!("{:x}@{}", md5::compute(seed.as_bytes()), UID_DOMAIN)
}

/// Renders `event` as an ICS document with CRLF line endings.
///
/// Times are written in UTC. An end that is missing or not after the start
/// is replaced by a one hour slot. `now` becomes the DTSTAMP.
pub fn export_event<T: TimeZone>(event: &Event, now: &DateTime<T>) -> String {
    let lines = [
        "BEGIN:VCALENDAR".to_string(),
        "VERSION:2.0".to_string(),
        format!("PRODID:{}", PRODID),
        "CALSCALE:GREGORIAN".to_string(),
        "BEGIN:VEVENT".to_string(),
        format!("UID:{}", escape_text(&export_uid(event))),
        format!("DTSTAMP:{}", format_ics_utc(now)),
        format!("DTSTART:{}", format_ics_utc(&event.start)),
        format!("DTEND:{}", format_ics_utc(&effective_end(event))),
        format!("SUMMARY:{}", escape_text(&event.summary)),
        format!("DESCRIPTION:{}", escape_text(&event.description)),
        format!("LOCATION:{}", escape_text(&event.location)),
        "END:VEVENT".to_string(),
        "END:VCALENDAR".to_string(),
    ];

    let mut out = lines.join("\r\n");
    out.push_str("\r\n");
    out
}
