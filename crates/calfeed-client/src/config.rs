//! Client configuration.
//!
//! All settings live in a single `config.toml` file at
//! `~/.config/calfeed/config.toml` by default. Every field is optional.
//!
//! ```toml
//! [feed]
//! source = "https://calendar.google.com/calendar/ical/.../basic.ics"
//! timezone = "Europe/Madrid"
//! allowed_domains = ["calendar.google.com"]
//!
//! [display]
//! lang = "en"
//! months = "current"
//! group_by_month = true
//!
//! [log]
//! level = "info"
//! format = "json"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use calfeed_core::agenda::{Language, MonthsMode};
use calfeed_core::tracing::{TracingConfig, TracingOutputFormat};
use calfeed_providers::FeedConfig;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::{ClientError, ClientResult};

/// Configuration for the calfeed client.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Feed settings.
    pub feed: FeedSettings,

    /// Display settings.
    pub display: DisplaySettings,

    /// Logging settings.
    pub log: LogSettings,
}

/// Where feeds come from and how they are fetched.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedSettings {
    /// Default feed URL.
    pub source: Option<String>,

    /// IANA zone used to display events and read floating times.
    pub timezone: String,

    /// Hosts feeds may come from. Empty allows any public host.
    pub allowed_domains: Vec<String>,

    /// Reject hosts that resolve to non-public addresses.
    pub dns_check: bool,

    /// Request timeout in seconds.
    pub timeout_secs: u64,

    /// Cache lifetime in seconds.
    pub cache_ttl_secs: u64,

    /// Maximum number of redirects to follow.
    pub max_redirects: usize,

    /// User agent override.
    pub user_agent: Option<String>,
}

impl Default for FeedSettings {
    fn default() -> Self {
        Self {
            source: None,
            timezone: "UTC".to_string(),
            allowed_domains: Vec::new(),
            dns_check: true,
            timeout_secs: FeedConfig::DEFAULT_TIMEOUT_SECS,
            cache_ttl_secs: FeedConfig::DEFAULT_CACHE_TTL_SECS,
            max_redirects: FeedConfig::DEFAULT_MAX_REDIRECTS,
            user_agent: None,
        }
    }
}

impl FeedSettings {
    /// Parses the configured zone.
    pub fn zone(&self) -> ClientResult<Tz> {
        self.timezone
            .parse::<Tz>()
            .map_err(|e| ClientError::Config(format!("invalid timezone {:?}: {}", self.timezone, e)))
    }

    /// Builds the provider configuration.
    pub fn to_feed_config(&self) -> ClientResult<FeedConfig> {
        let mut config = FeedConfig::new(self.zone()?)
            .with_timeout(Duration::from_secs(self.timeout_secs))
            .with_max_redirects(self.max_redirects)
            .with_cache_ttl(Duration::from_secs(self.cache_ttl_secs))
            .with_allowed_domains(&self.allowed_domains)
            .with_dns_check(self.dns_check);
        if let Some(user_agent) = &self.user_agent {
            config = config.with_user_agent(user_agent.clone());
        }
        Ok(config)
    }
}

/// Display defaults; command-line flags override them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplaySettings {
    /// Output language.
    pub lang: Language,

    /// Which months to show.
    pub months: MonthsMode,

    /// Print month sections; `false` lists occurrences in one run.
    pub group_by_month: bool,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            lang: Language::default(),
            months: MonthsMode::default(),
            group_by_month: true,
        }
    }
}

/// Log output settings. `--debug` overrides the level.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    /// Level for calfeed targets, e.g. `info`.
    pub level: Option<String>,

    /// `compact`, `pretty` or `json`.
    pub format: TracingOutputFormat,

    /// Full filter directive; wins over `level` and `RUST_LOG`.
    pub filter: Option<String>,
}

impl LogSettings {
    /// Builds the tracing configuration, with `debug` from the command line.
    pub fn tracing_config(&self, debug: bool) -> ClientResult<TracingConfig> {
        let mut config = if debug {
            TracingConfig::verbose()
        } else {
            TracingConfig::default()
        };

        if !debug && let Some(level) = &self.level {
            let level = level
                .parse::<tracing::Level>()
                .map_err(|e| ClientError::Config(format!("invalid log level {:?}: {}", level, e)))?;
            config = config.with_level(level);
        }
        if let Some(filter) = &self.filter {
            config = config.with_env_filter(filter.clone());
        }

        Ok(config.with_format(self.format))
    }
}

impl ClientConfig {
    /// Loads configuration from the default path, or defaults if it is absent.
    pub fn load() -> ClientResult<Self> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Loads configuration from a specific path.
    pub fn load_from(path: &Path) -> ClientResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ClientError::Config(format!("failed to read {}: {}", path.display(), e)))?;
        toml::from_str(&content)
            .map_err(|e| ClientError::Config(format!("failed to parse {}: {}", path.display(), e)))
    }

    /// Returns the default configuration file path.
    pub fn default_path() -> PathBuf {
        Self::default_config_dir().join("config.toml")
    }

    /// Returns the default configuration directory.
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("calfeed")
    }

    /// Returns the feed URL to use: `explicit` if given, else the configured one.
    pub fn resolve_source(&self, explicit: Option<String>) -> ClientResult<String> {
        explicit
            .or_else(|| self.feed.source.clone())
            .filter(|source| !source.trim().is_empty())
            .ok_or_else(|| {
                ClientError::Config("no feed source; pass --source or set feed.source".to_string())
            })
    }
}
