//! Event type for calendar feeds.
//!
//! [`Event`] represents one VEVENT from a feed, or one materialized
//! occurrence of a recurring VEVENT. Events are values: expansion builds new
//! events with [`Event::with_start_and_end`] and never touches the source.

use chrono::{DateTime, Datelike, Duration};
use chrono_tz::Tz;

use crate::time::is_local_midnight;

/// A calendar event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    /// The event title. May be empty; the presentation layer supplies a fallback.
    pub summary: String,
    /// Free-text description.
    pub description: String,
    /// Free-text location.
    pub location: String,
    /// Event URL.
    pub url: String,
    /// When the event starts.
    pub start: DateTime<Tz>,
    /// When the event ends, if known.
    pub end: Option<DateTime<Tz>>,
    /// The ICS UID.
    pub uid: String,
    /// Raw RRULE text. Empty for non-recurring events.
    pub rrule: String,
    /// Excluded occurrence start times.
    pub exdate: Vec<DateTime<Tz>>,
    /// Extra occurrence start times.
    pub rdate: Vec<DateTime<Tz>>,
}

impl Event {
    /// Creates a new event starting at `start` with every other field empty.
    pub fn new(start: DateTime<Tz>) -> Self {
        Self {
            summary: String::new(),
            description: String::new(),
            location: String::new(),
            url: String::new(),
            start,
            end: None,
            uid: String::new(),
            rrule: String::new(),
            exdate: Vec::new(),
            rdate: Vec::new(),
        }
    }

    /// Returns true if this event has a recurrence rule.
    pub fn is_recurring(&self) -> bool {
        !self.rrule.is_empty()
    }

    /// Returns true if the event starts, and ends when an end is known, at
    /// local midnight.
    pub fn is_all_day(&self) -> bool {
        is_local_midnight(&self.start) && self.end.as_ref().is_none_or(is_local_midnight)
    }

    /// Month of the start (1-12) in the display zone.
    pub fn month(&self) -> u32 {
        self.start.month()
    }

    /// Year of the start in the display zone.
    pub fn year(&self) -> i32 {
        self.start.year()
    }

    /// Returns `end - start` when an end is known. May be zero or negative.
    pub fn duration(&self) -> Option<Duration> {
        self.end.map(|end| end - self.start)
    }

    /// Returns a copy of this event moved to a new start and end.
    pub fn with_start_and_end(&self, start: DateTime<Tz>, end: Option<DateTime<Tz>>) -> Self {
        Self {
            start,
            end,
            ..self.clone()
        }
    }

    /// Builder method to set the summary.
    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = summary.into();
        self
    }

    /// Builder method to set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Builder method to set the location.
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    /// Builder method to set the URL.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Builder method to set the end.
    pub fn with_end(mut self, end: Option<DateTime<Tz>>) -> Self {
        self.end = end;
        self
    }

    /// Builder method to set the UID.
    pub fn with_uid(mut self, uid: impl Into<String>) -> Self {
        self.uid = uid.into();
        self
    }

    /// Builder method to set the raw RRULE text.
    pub fn with_rrule(mut self, rrule: impl Into<String>) -> Self {
        self.rrule = rrule.into();
        self
    }

    /// Builder method to set the exclusion dates.
    pub fn with_exdate(mut self, exdate: Vec<DateTime<Tz>>) -> Self {
        self.exdate = exdate;
        self
    }

    /// Builder method to set the extra occurrence dates.
    pub fn with_rdate(mut self, rdate: Vec<DateTime<Tz>>) -> Self {
        self.rdate = rdate;
        self
    }
}
