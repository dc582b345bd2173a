//! The `events` command: a year of feed occurrences, by month or flat.

use std::fmt::Write as _;

use calfeed_core::agenda::{Language, MonthsMode, filter_by_months_mode, format_when, group_by_month};
use calfeed_core::event::Event;
use calfeed_core::links::google_calendar_url;
use calfeed_core::time::format_ics_utc;
use calfeed_ics::materialize::expand_for_year;
use calfeed_ics::parser::RangeFilter;
use calfeed_providers::IcsFetcher;
use chrono::{DateTime, Datelike, Utc};
use chrono_tz::Tz;
use serde::Serialize;
use tracing::debug;

use crate::config::ClientConfig;
use crate::error::ClientResult;

/// Which year and months a listing covers, relative to "now".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgendaPlan {
    /// Year to expand.
    pub year: i32,
    /// Month the `current` mode starts from.
    pub current_month: u32,
    /// Months mode.
    pub mode: MonthsMode,
    /// Parse-time filter on event starts.
    pub range: RangeFilter,
}

impl AgendaPlan {
    /// Plans a listing of `year` (default: the year of `now`) in `mode`.
    ///
    /// Only a listing of the current year narrows by month; other years are
    /// shown whole.
    pub fn new(now: &DateTime<Tz>, year: Option<i32>, mode: MonthsMode) -> Self {
        let year = year.unwrap_or(now.year());
        if year != now.year() {
            return Self {
                year,
                current_month: 1,
                mode,
                range: RangeFilter::unbounded(),
            };
        }

        let range = mode
            .target_range(now)
            .map(|window| RangeFilter::new(Some(window.start), Some(window.end)))
            .unwrap_or_default();

        Self {
            year,
            current_month: now.month(),
            mode,
            range,
        }
    }

    /// Expands `events` for the planned year and keeps the planned months.
    pub fn occurrences(&self, events: &[Event], zone: Tz) -> Vec<Event> {
        let expanded = expand_for_year(events, self.year, zone);
        filter_by_months_mode(expanded, self.mode, self.current_month)
    }
}

/// JSON form of one occurrence.
#[derive(Debug, Clone, Serialize)]
pub struct OccurrenceView {
    pub uid: String,
    pub summary: String,
    pub description: String,
    pub location: String,
    pub url: String,
    pub start: String,
    pub end: Option<String>,
    pub all_day: bool,
    pub when: String,
    pub add_to_calendar: String,
}

impl OccurrenceView {
    /// Builds the view of `event` in `lang`.
    pub fn new(event: &Event, lang: Language) -> Self {
        Self {
            uid: event.uid.clone(),
            summary: display_title(event, lang).to_string(),
            description: event.description.clone(),
            location: event.location.clone(),
            url: event.url.clone(),
            start: event.start.to_rfc3339(),
            end: event.end.map(|end| end.to_rfc3339()),
            all_day: event.is_all_day(),
            when: format_when(event, lang),
            add_to_calendar: google_calendar_url(event),
        }
    }
}

fn display_title(event: &Event, lang: Language) -> &str {
    if event.summary.is_empty() {
        lang.labels().untitled_event
    } else {
        &event.summary
    }
}

/// Renders occurrences as text.
///
/// When `grouped`, each shown month gets a heading and its own "no
/// events" line; otherwise occurrences are listed in one run. A listing with
/// no occurrences at all prints the "no events" line once.
pub fn render_text(occurrences: &[Event], plan: &AgendaPlan, lang: Language, grouped: bool) -> String {
    let labels = lang.labels();
    let mut out = String::new();

    if occurrences.is_empty() {
        let _ = writeln!(out, "{}", labels.no_events);
        return out;
    }

    if !grouped {
        for event in occurrences {
            write_item(&mut out, event, lang);
        }
        return out;
    }

    let by_month = group_by_month(occurrences);
    for month in plan.mode.months_to_show(plan.current_month) {
        let _ = writeln!(out, "{} {}", lang.month_name(month), plan.year);

        let Some(events) = by_month.get(&month) else {
            let _ = writeln!(out, "  {}", labels.no_events);
            continue;
        };
        for event in events {
            write_item(&mut out, event, lang);
        }
    }

    out
}

fn write_item(out: &mut String, event: &Event, lang: Language) {
    let labels = lang.labels();

    let _ = writeln!(out, "  - {}", display_title(event, lang));
    let _ = writeln!(out, "    {}", format_when(event, lang));
    if !event.location.is_empty() {
        let _ = writeln!(out, "    {}{}", labels.location, event.location);
    }
    for line in event.description.lines() {
        let _ = writeln!(out, "    {}", line);
    }
    if !event.url.is_empty() {
        let _ = writeln!(out, "    {}: {}", labels.event_link, event.url);
    }
    let _ = writeln!(out, "    {}: {}", labels.add_to_calendar, google_calendar_url(event));
    if !event.uid.is_empty() {
        let _ = writeln!(
            out,
            "    {}: calfeed export --uid {} --start {}",
            labels.download_ics,
            event.uid,
            format_ics_utc(&event.start)
        );
    }
}

/// Renders occurrences as a JSON array.
pub fn render_json(occurrences: &[Event], lang: Language) -> ClientResult<String> {
    let views: Vec<OccurrenceView> = occurrences
        .iter()
        .map(|event| OccurrenceView::new(event, lang))
        .collect();
    Ok(serde_json::to_string_pretty(&views)?)
}

/// Options for the `events` command after merging flags with the config.
#[derive(Debug, Clone)]
pub struct EventsOptions {
    pub source: String,
    pub year: Option<i32>,
    pub months: MonthsMode,
    pub lang: Language,
    pub group_by_month: bool,
    pub json: bool,
}

/// Fetches the feed and prints its occurrences.
pub async fn run(config: &ClientConfig, options: EventsOptions) -> ClientResult<()> {
    let feed_config = config.feed.to_feed_config()?;
    let zone = feed_config.timezone;
    let now = Utc::now().with_timezone(&zone);
    let plan = AgendaPlan::new(&now, options.year, options.months);

    let fetcher = IcsFetcher::from_config(feed_config)?;
    let events = fetcher.events_from_source(&options.source, &plan.range).await?;
    let occurrences = plan.occurrences(&events, zone);
    debug!(events = events.len(), occurrences = occurrences.len(), year = plan.year, "Expanded feed");

    if options.json {
        println!("{}", render_json(&occurrences, options.lang)?);
    } else {
        print!(
            "{}",
            render_text(&occurrences, &plan, options.lang, options.group_by_month)
        );
    }

    Ok(())
}
