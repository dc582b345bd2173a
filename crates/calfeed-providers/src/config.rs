//! Feed fetching configuration.

use std::time::Duration;

use chrono_tz::Tz;

use crate::policy::normalize_allowed_domains;

/// Configuration for fetching and caching feeds.
#[derive(Debug, Clone)]
pub struct FeedConfig {
    /// Display zone used to read floating and date-only values.
    pub timezone: Tz,

    /// Request timeout.
    pub timeout: Duration,

    /// Maximum number of redirects to follow.
    pub max_redirects: usize,

    /// User agent string.
    pub user_agent: String,

    /// How long a parsed feed stays cached.
    pub cache_ttl: Duration,

    /// Hosts feeds may come from. Empty allows any public host.
    pub allowed_domains: Vec<String>,

    /// Whether to resolve feed hosts and reject non-public addresses.
    pub resolve_dns: bool,
}

impl FeedConfig {
    /// Default timeout in seconds.
    pub const DEFAULT_TIMEOUT_SECS: u64 = 20;

    /// Default redirect limit.
    pub const DEFAULT_MAX_REDIRECTS: usize = 3;

    /// Default cache TTL in seconds.
    pub const DEFAULT_CACHE_TTL_SECS: u64 = 3600;

    /// Creates a configuration with defaults for the given display zone.
    pub fn new(timezone: Tz) -> Self {
        Self {
            timezone,
            timeout: Duration::from_secs(Self::DEFAULT_TIMEOUT_SECS),
            max_redirects: Self::DEFAULT_MAX_REDIRECTS,
            user_agent: format!("calfeed/{}", env!("CARGO_PKG_VERSION")),
            cache_ttl: Duration::from_secs(Self::DEFAULT_CACHE_TTL_SECS),
            allowed_domains: Vec::new(),
            resolve_dns: true,
        }
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the redirect limit.
    pub fn with_max_redirects(mut self, max_redirects: usize) -> Self {
        self.max_redirects = max_redirects;
        self
    }

    /// Sets the user agent string.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Sets the cache TTL.
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    /// Sets the allowed hosts. Entries are normalized; invalid ones are dropped.
    pub fn with_allowed_domains<I, S>(mut self, domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.allowed_domains = normalize_allowed_domains(domains);
        self
    }

    /// Enables or disables the DNS check.
    pub fn with_dns_check(mut self, enabled: bool) -> Self {
        self.resolve_dns = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::Europe::Madrid;

    #[test]
    fn defaults() {
        let config = FeedConfig::new(Madrid);
        assert_eq!(config.timezone, Madrid);
        assert_eq!(config.timeout, Duration::from_secs(20));
        assert_eq!(config.max_redirects, 3);
        assert_eq!(config.cache_ttl, Duration::from_secs(3600));
        assert!(config.allowed_domains.is_empty());
        assert!(config.resolve_dns);
        assert!(config.user_agent.starts_with("calfeed/"));
    }

    #[test]
    fn builder_methods() {
        let config = FeedConfig::new(Madrid)
            .with_timeout(Duration::from_secs(5))
            .with_max_redirects(0)
            .with_user_agent("test-agent")
            .with_cache_ttl(Duration::from_secs(60))
            .with_dns_check(false)
            .with_allowed_domains([" Calendar.Google.com ", "bad domain", ".example.org"]);

        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.max_redirects, 0);
        assert_eq!(config.user_agent, "test-agent");
        assert_eq!(config.cache_ttl, Duration::from_secs(60));
        assert!(!config.resolve_dns);
        assert_eq!(config.allowed_domains, vec!["calendar.google.com", "example.org"]);
    }
}
