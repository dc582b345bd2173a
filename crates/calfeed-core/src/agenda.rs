//! Agenda helpers for presenting occurrences.
//!
//! Occurrence lists come out of the recurrence engine flat and sorted. The
//! helpers here narrow them to the months a view shows, group them by month
//! and render the "when" line in the two supported languages.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::event::Event;
use crate::time::TimeWindow;

/// Display language.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Language {
    #[default]
    Es,
    En,
}

/// Static UI strings for one language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Labels {
    pub untitled_event: &'static str,
    pub no_events: &'static str,
    pub location: &'static str,
    pub event_link: &'static str,
    pub add_to_calendar: &'static str,
    pub download_ics: &'static str,
}

const EN_MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

const ES_MONTHS: [&str; 12] = [
    "Enero",
    "Febrero",
    "Marzo",
    "Abril",
    "Mayo",
    "Junio",
    "Julio",
    "Agosto",
    "Septiembre",
    "Octubre",
    "Noviembre",
    "Diciembre",
];

impl Language {
    /// Parses a language code, falling back to the default for unknown input.
    pub fn from_code(code: &str) -> Self {
        match code.trim().to_ascii_lowercase().as_str() {
            "en" => Self::En,
            "es" => Self::Es,
            _ => Self::default(),
        }
    }

    /// Returns the name of `month` (1-12), or an empty string when out of range.
    pub fn month_name(&self, month: u32) -> &'static str {
        let names = match self {
            Self::Es => &ES_MONTHS,
            Self::En => &EN_MONTHS,
        };
        month
            .checked_sub(1)
            .and_then(|index| names.get(index as usize))
            .copied()
            .unwrap_or_default()
    }

    /// Returns the UI strings for this language.
    pub fn labels(&self) -> Labels {
        match self {
            Self::En => Labels {
                untitled_event: "Untitled event",
                no_events: "No events for this month.",
                location: "Location: ",
                event_link: "Open event link",
                add_to_calendar: "Add to calendar",
                download_ics: "Download .ics",
            },
            Self::Es => Labels {
                untitled_event: "Sin título",
                no_events: "Sin eventos para este mes.",
                location: "Ubicación: ",
                event_link: "Abrir enlace del evento",
                add_to_calendar: "Agregar al calendario",
                download_ics: "Descargar .ics",
            },
        }
    }
}

/// Which months of the current year a view shows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MonthsMode {
    /// Every month of the year.
    #[default]
    All,
    /// The current month through December.
    Current,
}

impl MonthsMode {
    /// Parses a mode name, falling back to the default for unknown input.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "current" => Self::Current,
            "all" => Self::All,
            _ => Self::default(),
        }
    }

    /// Returns the months (1-12) shown when the current month is `current_month`.
    pub fn months_to_show(&self, current_month: u32) -> Vec<u32> {
        match self {
            Self::All => (1..=12).collect(),
            Self::Current => (current_month.clamp(1, 12)..=12).collect(),
        }
    }

    /// Parse-time range for this mode relative to `now`.
    ///
    /// `All` is unbounded. `Current` spans the first day of the current month
    /// through the end of the current year.
    pub fn target_range(&self, now: &DateTime<Tz>) -> Option<TimeWindow> {
        match self {
            Self::All => None,
            Self::Current => TimeWindow::rest_of_year(now.year(), now.month(), now.timezone()),
        }
    }
}

/// Keeps the events a view in `mode` shows, given the current month.
pub fn filter_by_months_mode(events: Vec<Event>, mode: MonthsMode, current_month: u32) -> Vec<Event> {
    match mode {
        MonthsMode::All => events,
        MonthsMode::Current => events
            .into_iter()
            .filter(|event| event.month() >= current_month)
            .collect(),
    }
}

/// Groups events by start month, preserving order within each month.
pub fn group_by_month(events: &[Event]) -> BTreeMap<u32, Vec<Event>> {
    let mut by_month: BTreeMap<u32, Vec<Event>> = BTreeMap::new();
    for event in events {
        by_month.entry(event.month()).or_default().push(event.clone());
    }
    by_month
}

/// Renders when an event happens.
///
/// All-day events show only the start date. Timed events show the start and,
/// when known, ` - ` and the end.
pub fn format_when(event: &Event, lang: Language) -> String {
    if event.is_all_day() {
        let pattern = match lang {
            Language::En => "%m/%d/%Y",
            Language::Es => "%d/%m/%Y",
        };
        return event.start.format(pattern).to_string();
    }

    let mut when = format_datetime(&event.start, lang);
    if let Some(end) = &event.end {
        when.push_str(" - ");
        when.push_str(&format_datetime(end, lang));
    }
    when
}

fn format_datetime(dt: &DateTime<Tz>, lang: Language) -> String {
    let pattern = match lang {
        Language::En => "%m/%d/%Y %I:%M %p",
        Language::Es => "%d/%m/%Y %H:%M",
    };
    dt.format(pattern).to_string()
}
