//! Turning parsed events into concrete occurrences.

use calfeed_core::event::Event;
use calfeed_core::time::TimeWindow;
use chrono_tz::Tz;
use tracing::debug;

use crate::recurrence::{RecurrenceRule, expand};

/// Materializes every occurrence of `events` that falls inside `window`.
///
/// Plain events are kept when their start is inside the window. Recurring
/// events are expanded; each occurrence keeps the source's fields and its
/// duration, so `end` moves with `start` and stays absent when the source
/// had none. An end that cannot be represented is dropped. A recurring
/// event with an unsupported rule contributes nothing. The result is sorted
/// by start.
pub fn expand_in_window(events: &[Event], window: &TimeWindow) -> Vec<Event> {
    let mut occurrences = Vec::new();

    for event in events {
        if !event.is_recurring() {
            if window.contains(&event.start) {
                occurrences.push(event.clone());
            }
            continue;
        }

        let Some(rule) = RecurrenceRule::parse(&event.rrule, event.start.timezone()) else {
            continue;
        };

        let duration = event.duration();
        let starts = expand(event, &rule, window);
        debug!(uid = %event.uid, count = starts.len(), "Expanded recurring event");

        occurrences.extend(starts.into_iter().map(|start| {
            let end = duration.and_then(|d| {
                let end = start.checked_add_signed(d);
                if end.is_none() {
                    debug!(uid = %event.uid, %start, "Occurrence end out of range; dropping end");
                }
                end
            });
            event.with_start_and_end(start, end)
        }));
    }

    occurrences.sort_by(|a, b| a.start.cmp(&b.start));
    occurrences
}

/// Materializes the occurrences of `events` in calendar `year` of `zone`.
///
/// Returns an empty list if the year cannot be represented.
pub fn expand_for_year(events: &[Event], year: i32, zone: Tz) -> Vec<Event> {
    match TimeWindow::for_year(year, zone) {
        Some(window) => expand_in_window(events, &window),
        None => Vec::new(),
    }
}
