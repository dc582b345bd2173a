//! Feed fetching with policy checks and caching.
//!
//! [`IcsFetcher`] ties the pieces together: the URL policy runs first, then
//! the cache is consulted, and only on a miss is the feed downloaded and
//! parsed. Parsed events are cached as a [`CachePayload`].

use std::sync::Arc;

use calfeed_core::event::Event;
use calfeed_core::payload::CachePayload;
use calfeed_ics::parser::{RangeFilter, parse_ics};
use chrono::Utc;
use tokio::sync::Mutex;
use tracing::{Level, debug, warn};

use crate::cache::FeedCache;
use crate::config::FeedConfig;
use crate::error::FeedResult;
use crate::policy::UrlPolicy;
use crate::source::FeedSource;

/// Prefix of every cache key.
pub const CACHE_KEY_PREFIX: &str = "calfeed_";

/// Builds the cache key for `source` fetched with `range`.
pub fn cache_key(source: &str, range: &RangeFilter) -> String {
    let bound = |dt: Option<String>| dt.unwrap_or_else(|| "null".to_string());
    let seed = format!(
        "{}|{}|{}",
        source,
        bound(range.start.map(|dt| dt.to_rfc3339())),
        bound(range.end.map(|dt| dt.to_rfc3339())),
    );
    format!("{}{:x}", CACHE_KEY_PREFIX, md5::compute(seed.as_bytes()))
}

/// Fetches, parses and caches ICS feeds.
pub struct IcsFetcher {
    config: FeedConfig,
    source: Arc<dyn FeedSource>,
    policy: Arc<dyn UrlPolicy>,
    cache: Arc<Mutex<FeedCache>>,
}

impl IcsFetcher {
    /// Creates a fetcher from explicit parts with a private cache.
    pub fn new(config: FeedConfig, source: Arc<dyn FeedSource>, policy: Arc<dyn UrlPolicy>) -> Self {
        let cache = Arc::new(Mutex::new(FeedCache::new(config.cache_ttl)));
        Self {
            config,
            source,
            policy,
            cache,
        }
    }

    /// Creates a fetcher that downloads over HTTP and applies [`HostPolicy`](crate::policy::HostPolicy).
    #[cfg(feature = "http")]
    pub fn from_config(config: FeedConfig) -> FeedResult<Self> {
        let source = crate::http::HttpFeedSource::new(&config)?;
        let policy = crate::policy::HostPolicy::new()
            .with_allowed_domains(&config.allowed_domains)
            .with_dns_check(config.resolve_dns);
        Ok(Self::new(config, Arc::new(source), Arc::new(policy)))
    }

    /// Shares `cache` with other fetchers.
    pub fn with_cache(mut self, cache: Arc<Mutex<FeedCache>>) -> Self {
        self.cache = cache;
        self
    }

    /// Returns the configuration.
    pub fn config(&self) -> &FeedConfig {
        &self.config
    }

    /// Returns the events of the feed at `source` whose start lies in `range`.
    ///
    /// # Errors
    ///
    /// Returns a `policy_violation` error if the URL is rejected, or the
    /// source's error if the download fails. Nothing is cached on failure.
    pub async fn events_from_source(&self, source: &str, range: &RangeFilter) -> FeedResult<Vec<Event>> {
        self.policy.validate(source).await?;

        let key = cache_key(source, range);
        let zone = self.config.timezone;

        {
            let mut cache = self.cache.lock().await;
            let cached = cache.get_valid(&key).map(|raw| {
                serde_json::from_str::<CachePayload>(raw)
                    .ok()
                    .and_then(|payload| payload.into_events(zone))
            });

            match cached {
                Some(Some(events)) => {
                    debug!(key = %key, count = events.len(), "Cache hit");
                    return Ok(events);
                }
                Some(None) => {
                    debug!(key = %key, "Discarding unreadable cache entry");
                    cache.remove(&key);
                }
                None => debug!(key = %key, "Cache miss"),
            }
        }

        let body = self.source.fetch(source).await?;
        let events = parse_ics(&body, zone, range);

        if tracing::enabled!(Level::DEBUG) && (range.start.is_some() || range.end.is_some()) {
            let before = parse_ics(&body, zone, &RangeFilter::unbounded()).len();
            debug!(
                source = self.source.name(),
                before,
                after = events.len(),
                start = ?range.start,
                end = ?range.end,
                "Applied range filter"
            );
        }

        match serde_json::to_string(&CachePayload::from_events(&events, Utc::now())) {
            Ok(payload) => self.cache.lock().await.insert(key, payload),
            Err(e) => warn!(error = %e, "Failed to serialize cache payload"),
        }

        Ok(events)
    }
}
