//! Add-to-calendar links for events.

use chrono::{DateTime, Duration};
use chrono_tz::Tz;

use crate::event::Event;
use crate::time::format_ics_utc;

const GOOGLE_CALENDAR_RENDER_URL: &str = "https://calendar.google.com/calendar/render";

/// Returns the end to publish for `event`.
///
/// Events without an end, or whose end is not after the start, get a one
/// hour slot. At the very end of the representable range the slot is empty.
pub fn effective_end(event: &Event) -> DateTime<Tz> {
    match event.end {
        Some(end) if end > event.start => end,
        _ => event
            .start
            .checked_add_signed(Duration::hours(1))
            .unwrap_or(event.start),
    }
}

/// Builds a Google Calendar "create event" template URL for `event`.
///
/// Query values are percent-encoded per RFC 3986.
pub fn google_calendar_url(event: &Event) -> String {
    let dates = format!(
        "{}/{}",
        format_ics_utc(&event.start),
        format_ics_utc(&effective_end(event))
    );

    let params = [
        ("action", "TEMPLATE"),
        ("text", event.summary.as_str()),
        ("dates", dates.as_str()),
        ("location", event.location.as_str()),
        ("details", event.description.as_str()),
    ];

    let query = params
        .iter()
        .map(|(key, value)| format!("{}={}", key, urlencoding::encode(value)))
        .collect::<Vec<_>>()
        .join("&");

    format!("{}?{}", GOOGLE_CALENDAR_RENDER_URL, query)
}
