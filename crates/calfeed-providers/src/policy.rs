//! Feed URL policy.
//!
//! Feed URLs come from configuration or user input, so they are checked
//! before any request is made. [`HostPolicy`] only lets HTTPS URLs through
//! whose host is public, optionally restricted to an allow-list, and
//! optionally resolved to make sure the name does not point inward.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, trace};
use url::{Host, Url};

use crate::error::{FeedError, FeedResult};
use crate::source::BoxFuture;

static DOMAIN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9.-]+$").expect("valid domain regex"));

const INTERNAL_HOSTS: [&str; 2] = ["localhost", "loopback"];
const INTERNAL_SUFFIXES: [&str; 5] = [".localhost", ".local", ".internal", ".home", ".lan"];

/// Something that decides whether a feed URL may be fetched.
pub trait UrlPolicy: Send + Sync {
    /// Checks `url`.
    ///
    /// # Errors
    ///
    /// Returns a `policy_violation` error whose message is the reason.
    fn validate<'a>(&'a self, url: &'a str) -> BoxFuture<'a, FeedResult<()>>;
}

/// Normalizes allow-list entries.
///
/// Entries are trimmed and lowercased. Empty entries and entries with
/// characters outside `[a-z0-9.-]` are dropped, leading dots are stripped and
/// duplicates removed, keeping the first occurrence.
pub fn normalize_allowed_domains<I, S>(domains: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut normalized: Vec<String> = Vec::new();
    for raw in domains {
        let domain = raw.as_ref().trim().to_ascii_lowercase();
        if domain.is_empty() || !DOMAIN_RE.is_match(&domain) {
            continue;
        }
        let domain = domain.trim_start_matches('.').to_string();
        if !normalized.contains(&domain) {
            normalized.push(domain);
        }
    }
    normalized
}

/// Returns true for names reserved for local networks.
pub fn is_internal_hostname(host: &str) -> bool {
    INTERNAL_HOSTS.contains(&host) || INTERNAL_SUFFIXES.iter().any(|suffix| host.ends_with(suffix))
}

/// Returns true if `ip` is routable on the public internet.
pub fn is_public_ip(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => is_public_ipv4(v4),
        IpAddr::V6(v6) => is_public_ipv6(v6),
    }
}

fn is_public_ipv4(ip: Ipv4Addr) -> bool {
    let [a, b, ..] = ip.octets();
    let reserved = a == 0 || a >= 240 || (a == 100 && (64..128).contains(&b));
    !(ip.is_private() || ip.is_loopback() || ip.is_link_local() || ip.is_broadcast() || reserved)
}

fn is_public_ipv6(ip: Ipv6Addr) -> bool {
    if let Some(v4) = ip.to_ipv4_mapped() {
        return is_public_ipv4(v4);
    }
    let first = ip.segments()[0];
    let unique_local = (first & 0xfe00) == 0xfc00;
    let link_local = (first & 0xffc0) == 0xfe80;
    !(ip.is_loopback() || ip.is_unspecified() || unique_local || link_local)
}

fn matches_allow_list(host: &str, allowed: &[String]) -> bool {
    allowed.iter().any(|domain| {
        host == domain
            || host
                .strip_suffix(domain.as_str())
                .is_some_and(|prefix| prefix.ends_with('.'))
    })
}

/// The default URL policy.
#[derive(Debug, Clone, Default)]
pub struct HostPolicy {
    allowed_domains: Vec<String>,
    resolve_dns: bool,
}

impl HostPolicy {
    /// Creates a policy with no allow-list and no DNS check.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts hosts to the given domains and their subdomains.
    pub fn with_allowed_domains<I, S>(mut self, domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.allowed_domains = normalize_allowed_domains(domains);
        self
    }

    /// Enables or disables resolving the host.
    pub fn with_dns_check(mut self, enabled: bool) -> Self {
        self.resolve_dns = enabled;
        self
    }

    /// Returns the normalized allow-list.
    pub fn allowed_domains(&self) -> &[String] {
        &self.allowed_domains
    }

    /// Runs every check that needs no network access.
    ///
    /// Returns the host name to resolve, or `None` when the host is an IP
    /// literal and there is nothing to resolve.
    pub fn check_static(&self, url: &str) -> FeedResult<Option<String>> {
        let parsed =
            Url::parse(url).map_err(|e| FeedError::policy_violation("Invalid URL format.").with_source(e))?;

        if parsed.scheme() != "https" {
            return Err(FeedError::policy_violation("Only HTTPS URLs are allowed."));
        }

        let Some(host) = parsed.host() else {
            return Err(FeedError::policy_violation("URL host is required."));
        };

        let (name, ip) = match host {
            Host::Domain(domain) => (domain.to_ascii_lowercase(), None),
            Host::Ipv4(v4) => (v4.to_string(), Some(IpAddr::V4(v4))),
            Host::Ipv6(v6) => (v6.to_string(), Some(IpAddr::V6(v6))),
        };

        if name.is_empty() {
            return Err(FeedError::policy_violation("URL host is required."));
        }

        if is_internal_hostname(&name) {
            return Err(FeedError::policy_violation("Internal hosts are not allowed."));
        }

        if let Some(ip) = ip
            && !is_public_ip(ip)
        {
            return Err(FeedError::policy_violation(
                "Private or local IP addresses are not allowed.",
            ));
        }

        if !self.allowed_domains.is_empty() && !matches_allow_list(&name, &self.allowed_domains) {
            return Err(FeedError::policy_violation(
                "Host is not in the allowed domains whitelist.",
            ));
        }

        Ok(ip.is_none().then_some(name))
    }
}

impl UrlPolicy for HostPolicy {
    fn validate<'a>(&'a self, url: &'a str) -> BoxFuture<'a, FeedResult<()>> {
        Box::pin(async move {
            let host = self.check_static(url)?;

            let Some(host) = host.filter(|_| self.resolve_dns) else {
                return Ok(());
            };

            // Names that do not resolve pass; the request itself will fail.
            let addrs = match tokio::net::lookup_host((host.as_str(), 443)).await {
                Ok(addrs) => addrs,
                Err(e) => {
                    debug!(host = %host, error = %e, "Could not resolve feed host");
                    return Ok(());
                }
            };

            for addr in addrs {
                trace!(host = %host, ip = %addr.ip(), "Resolved feed host");
                if !is_public_ip(addr.ip()) {
                    return Err(FeedError::policy_violation(
                        "Host resolves to a private or local IP address.",
                    ));
                }
            }

            Ok(())
        })
    }
}
