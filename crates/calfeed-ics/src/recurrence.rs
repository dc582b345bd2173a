//! RRULE parsing and occurrence expansion.
//!
//! Only the frequency, interval, count and until parts of a rule are
//! understood. BY* modifiers are ignored, so a rule using them expands as if
//! they were absent.
//!
//! Expansion is bounded: no event yields more than [`MAX_OCCURRENCES`] rule
//! candidates, whatever its COUNT says.

use std::collections::{BTreeMap, HashSet};

use calfeed_core::event::Event;
use calfeed_core::time::{TimeWindow, parse_ics_date, resolve_local, second_key};
use chrono::{DateTime, Days, Months, NaiveDateTime};
use chrono_tz::Tz;
use tracing::{debug, trace};

/// Hard cap on rule-generated candidates per event.
pub const MAX_OCCURRENCES: u32 = 500;

/// Recurrence frequency.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl Frequency {
    /// Parses an uppercased FREQ value.
    pub fn from_value(value: &str) -> Option<Self> {
        match value {
            "DAILY" => Some(Self::Daily),
            "WEEKLY" => Some(Self::Weekly),
            "MONTHLY" => Some(Self::Monthly),
            "YEARLY" => Some(Self::Yearly),
            _ => None,
        }
    }

    /// Moves `anchor` forward by `units` steps of this frequency on the wall
    /// clock.
    ///
    /// Month and year steps clamp to the last day of the target month.
    fn advance(self, anchor: NaiveDateTime, units: u32) -> Option<NaiveDateTime> {
        match self {
            Self::Daily => anchor.checked_add_days(Days::new(u64::from(units))),
            Self::Weekly => anchor.checked_add_days(Days::new(u64::from(units) * 7)),
            Self::Monthly => anchor.checked_add_months(Months::new(units)),
            Self::Yearly => anchor.checked_add_months(Months::new(units.checked_mul(12)?)),
        }
    }
}

/// Splits RRULE text into uppercased `KEY=VALUE` pairs.
///
/// Empty segments and segments without `=` are skipped. A repeated key keeps
/// its last value.
pub fn rule_pairs(text: &str) -> BTreeMap<String, String> {
    text.split(';')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .filter_map(|part| part.split_once('='))
        .map(|(key, value)| (key.trim().to_ascii_uppercase(), value.trim().to_ascii_uppercase()))
        .filter(|(key, _)| !key.is_empty())
        .collect()
}

/// Reads the integer at the start of `value`, as loose numeric casts do.
///
/// An optional sign followed by digits; anything after is ignored. No
/// digits reads as zero. Out-of-range values saturate.
fn leading_int(value: &str) -> i64 {
    let value = value.trim_start();
    let (negative, digits) = match value.as_bytes().first() {
        Some(b'-') => (true, &value[1..]),
        Some(b'+') => (false, &value[1..]),
        _ => (false, value),
    };

    let magnitude = digits
        .bytes()
        .take_while(u8::is_ascii_digit)
        .fold(0i64, |acc, digit| {
            acc.saturating_mul(10).saturating_add(i64::from(digit - b'0'))
        });

    if negative { -magnitude } else { magnitude }
}

/// A parsed recurrence rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecurrenceRule {
    /// How often the event repeats.
    pub frequency: Frequency,
    /// Steps of `frequency` between occurrences. Always at least 1.
    pub interval: u32,
    /// COUNT as written, if present.
    pub count: Option<i64>,
    /// Inclusive last allowed start, if UNTIL was present and parseable.
    pub until: Option<DateTime<Tz>>,
}

impl RecurrenceRule {
    /// Parses RRULE text. UNTIL is read in `zone`.
    ///
    /// Returns `None` when FREQ is missing or not one of DAILY, WEEKLY,
    /// MONTHLY or YEARLY.
    pub fn parse(text: &str, zone: Tz) -> Option<Self> {
        let pairs = rule_pairs(text);

        let Some(frequency) = pairs.get("FREQ").and_then(|freq| Frequency::from_value(freq)) else {
            debug!(rule = text, "Unsupported or missing FREQ");
            return None;
        };

        let interval = pairs
            .get("INTERVAL")
            .map(|value| leading_int(value).clamp(1, i64::from(u32::MAX)))
            .and_then(|value| u32::try_from(value).ok())
            .unwrap_or(1);

        let count = pairs.get("COUNT").map(|value| leading_int(value));

        let until = pairs.get("UNTIL").and_then(|value| {
            let parsed = parse_ics_date(Some(value), zone);
            if parsed.is_none() {
                trace!(until = %value, "Ignoring unparseable UNTIL");
            }
            parsed
        });

        Some(Self {
            frequency,
            interval,
            count,
            until,
        })
    }

    /// Number of rule candidates expansion may generate.
    pub fn occurrence_cap(&self) -> u32 {
        let requested = self.count.unwrap_or(i64::from(MAX_OCCURRENCES));
        // Clamped into 1..=MAX_OCCURRENCES, so the cast cannot truncate.
        requested.clamp(1, i64::from(MAX_OCCURRENCES)) as u32
    }

    /// The `n`-th candidate after `anchor` on the wall clock.
    fn nth_after(&self, anchor: NaiveDateTime, n: u32) -> Option<NaiveDateTime> {
        self.frequency.advance(anchor, n.checked_mul(self.interval)?)
    }
}

/// Expands `event` under `rule` into occurrence starts within `window`.
///
/// Candidates run from the event's start. Each candidate counts toward the
/// cap whether or not it lands in the window. Generation stops at the cap,
/// at the first candidate past UNTIL when UNTIL is set, otherwise at the
/// first candidate past the window end. Candidates matching an EXDATE are
/// dropped. RDATEs inside the window are then merged in unless excluded or
/// already present. The result is sorted and free of duplicates.
///
/// Each candidate is computed from the original start rather than the
/// previous candidate, so a day-of-month clamped in a short month is restored
/// in the following months.
pub fn expand(event: &Event, rule: &RecurrenceRule, window: &TimeWindow) -> Vec<DateTime<Tz>> {
    let zone = event.start.timezone();
    let anchor = event.start.naive_local();
    let excluded: HashSet<i64> = event.exdate.iter().map(second_key).collect();

    let mut occurrences = Vec::new();
    let mut seen = HashSet::new();
    let mut candidate = event.start;

    for step in 1..=rule.occurrence_cap() {
        match rule.until {
            Some(until) if candidate > until => break,
            None if candidate > window.end => break,
            _ => {}
        }

        let key = second_key(&candidate);
        if !excluded.contains(&key) && window.contains(&candidate) && seen.insert(key) {
            occurrences.push(candidate);
        }

        let Some(next) = rule
            .nth_after(anchor, step)
            .and_then(|naive| resolve_local(zone, naive))
        else {
            break;
        };
        if next <= candidate {
            trace!(uid = %event.uid, "Recurrence stopped advancing");
            break;
        }
        candidate = next;
    }

    for rdate in &event.rdate {
        let key = second_key(rdate);
        if window.contains(rdate) && !excluded.contains(&key) && seen.insert(key) {
            occurrences.push(*rdate);
        }
    }

    occurrences.sort();
    occurrences
}
