//! Feed acquisition for calfeed.
//!
//! This crate sits between a feed URL and the parser:
//!
//! - [`UrlPolicy`] - Decides whether a URL may be fetched ([`HostPolicy`])
//! - [`FeedSource`] - Downloads raw ICS text ([`HttpFeedSource`])
//! - [`FeedCache`] - TTL cache of parsed feeds
//! - [`IcsFetcher`] - Runs policy, cache, download and parse in order
//! - [`FeedError`] - Error types for feed operations
//!
//! # Architecture
//!
//! ```text
//!   feed URL
//!      │
//!      ▼ UrlPolicy::validate()
//! ┌─────────────┐  hit   ┌──────────────┐
//! │  FeedCache  │ ─────▶ │  Vec<Event>  │
//! └──────┬──────┘        └──────────────┘
//!        │ miss                 ▲
//!        ▼ FeedSource::fetch()  │ parse_ics()
//! ┌─────────────┐               │
//! │  ICS text   │ ──────────────┘
//! └─────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use calfeed_providers::{FeedConfig, IcsFetcher};
//! use calfeed_ics::RangeFilter;
//!
//! let fetcher = IcsFetcher::from_config(FeedConfig::new(chrono_tz::Europe::Madrid))?;
//! let events = fetcher.events_from_source(url, &RangeFilter::unbounded()).await?;
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod fetcher;
#[cfg(feature = "http")]
pub mod http;
pub mod policy;
pub mod source;

// Re-export main types at crate root
pub use cache::{CacheEntry, FeedCache};
pub use config::FeedConfig;
pub use error::{FeedError, FeedErrorCode, FeedResult};
pub use fetcher::{cache_key, IcsFetcher, CACHE_KEY_PREFIX};
#[cfg(feature = "http")]
pub use http::{check_redirect, classify_status, HttpFeedSource};
pub use policy::{is_internal_hostname, is_public_ip, normalize_allowed_domains, HostPolicy, UrlPolicy};
pub use source::{BoxFuture, FeedSource};
