//! Core types: time, events, cache payloads, agenda helpers, links

pub mod agenda;
pub mod event;
pub mod links;
pub mod payload;
pub mod time;
pub mod tracing;

pub use agenda::{filter_by_months_mode, format_when, group_by_month, Labels, Language, MonthsMode};
pub use event::Event;
pub use links::{effective_end, google_calendar_url};
pub use payload::{CachePayload, EventRow, CACHE_SCHEMA_VERSION};
pub use time::{format_ics_utc, parse_ics_date, resolve_local, second_key, TimeWindow};
pub use tracing::{init_tracing, TracingConfig, TracingError, TracingOutputFormat};
