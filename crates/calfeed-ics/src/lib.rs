//! ICS feed parsing and recurrence expansion.
//!
//! The pipeline is [`unfold`] -> [`parse_events`] -> [`expand_for_year`]:
//! raw feed text becomes logical lines, then [`Event`] records, then a flat
//! list of concrete occurrences sorted by start.
//!
//! [`Event`]: calfeed_core::Event

pub mod export;
pub mod materialize;
pub mod parser;
pub mod recurrence;
pub mod text;
pub mod unfold;

pub use export::{export_event, export_uid, PRODID};
pub use materialize::{expand_for_year, expand_in_window};
pub use parser::{parse_date_list, parse_events, parse_ics, RangeFilter};
pub use recurrence::{expand, rule_pairs, Frequency, RecurrenceRule, MAX_OCCURRENCES};
pub use text::{decode_text, escape_text};
pub use unfold::unfold;
