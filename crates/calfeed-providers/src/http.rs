//! HTTP feed source.

use reqwest::{Client, redirect};
use tracing::{debug, trace, warn};
use url::Url;

use crate::config::FeedConfig;
use crate::error::{FeedError, FeedResult};
use crate::policy::HostPolicy;
use crate::source::{BoxFuture, FeedSource};

/// Maps an HTTP status to a feed result.
pub fn classify_status(status: u16) -> FeedResult<()> {
    if (200..300).contains(&status) {
        Ok(())
    } else {
        Err(FeedError::bad_status(status))
    }
}

/// Decides whether a redirect to `next` may be followed.
///
/// `requested` counts the URLs already requested in the chain, the original
/// one included. Every hop must pass the same static checks as the feed URL.
pub fn check_redirect(policy: &HostPolicy, next: &Url, requested: usize, max_redirects: usize) -> FeedResult<()> {
    if requested > max_redirects {
        return Err(FeedError::request_failed(format!(
            "Too many redirects (limit {})",
            max_redirects
        )));
    }
    policy.check_static(next.as_str()).map(|_| ())
}

/// Returns the policy error that stopped a redirect chain, if any.
fn redirect_rejection(err: &reqwest::Error) -> Option<FeedError> {
    let mut source = std::error::Error::source(err);
    while let Some(inner) = source {
        if let Some(rejected) = inner.downcast_ref::<FeedError>() {
            return Some(FeedError::new(rejected.code(), rejected.message()));
        }
        source = inner.source();
    }
    None
}

/// Downloads feeds over HTTP(S) with reqwest.
#[derive(Debug, Clone)]
pub struct HttpFeedSource {
    client: Client,
}

impl HttpFeedSource {
    /// Creates a source using the timeout, redirect limit, user agent and
    /// allow-list from `config`.
    pub fn new(config: &FeedConfig) -> FeedResult<Self> {
        let policy = HostPolicy::new().with_allowed_domains(&config.allowed_domains);
        let max_redirects = config.max_redirects;
        let redirects = redirect::Policy::custom(move |attempt| {
            let verdict = check_redirect(&policy, attempt.url(), attempt.previous().len(), max_redirects);
            match verdict {
                Ok(()) => attempt.follow(),
                Err(e) => {
                    warn!(url = %attempt.url(), reason = e.message(), "Refusing redirect");
                    attempt.error(e)
                }
            }
        });

        let client = Client::builder()
            .timeout(config.timeout)
            .redirect(redirects)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| {
                FeedError::request_failed(format!("Failed to create HTTP client: {}", e)).with_source(e)
            })?;

        Ok(Self { client })
    }
}

impl FeedSource for HttpFeedSource {
    fn name(&self) -> &str {
        "http"
    }

    fn fetch<'a>(&'a self, url: &'a str) -> BoxFuture<'a, FeedResult<String>> {
        Box::pin(async move {
            trace!(url = %url, "Requesting feed");

            let response = self.client.get(url).send().await.map_err(|e| {
                if let Some(rejected) = redirect_rejection(&e) {
                    return rejected;
                }
                warn!(url = %url, error = %e, "Feed request failed");
                FeedError::request_failed(format!("Request failed: {}", e)).with_source(e)
            })?;

            let status = response.status().as_u16();
            if let Err(e) = classify_status(status) {
                warn!(url = %url, status, "Feed returned a non-success status");
                return Err(e);
            }

            let body = response.text().await.map_err(|e| {
                warn!(url = %url, error = %e, "Failed to read feed body");
                FeedError::request_failed(format!("Failed to read response body: {}", e))
                    .with_source(e)
                    .with_status(status)
            })?;

            if body.is_empty() {
                warn!(url = %url, status, "Feed body is empty");
                return Err(FeedError::empty_response(status));
            }

            debug!(url = %url, bytes = body.len(), "Downloaded feed");
            Ok(body)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FeedErrorCode;
    use chrono_tz::UTC;

    #[test]
    fn success_statuses() {
        assert!(classify_status(200).is_ok());
        assert!(classify_status(204).is_ok());
        assert!(classify_status(299).is_ok());
    }

    #[test]
    fn failure_statuses() {
        for status in [199, 301, 404, 500] {
            let err = classify_status(status).unwrap_err();
            assert_eq!(err.code(), FeedErrorCode::BadStatus);
            assert_eq!(err.status(), Some(status));
        }
    }

    mod redirects {
        use super::*;

        fn url(raw: &str) -> Url {
            Url::parse(raw).unwrap()
        }

        #[test]
        fn public_hop_is_followed() {
            let policy = HostPolicy::new();
            assert!(check_redirect(&policy, &url("https://cdn.example.com/a.ics"), 1, 3).is_ok());
        }

        #[test]
        fn hop_to_metadata_address_is_refused() {
            let policy = HostPolicy::new();
            let err = check_redirect(&policy, &url("https://169.254.169.254/latest/meta-data"), 1, 3).unwrap_err();
            assert_eq!(err.code(), FeedErrorCode::PolicyViolation);
            assert_eq!(err.message(), "Private or local IP addresses are not allowed.");
        }

        #[test]
        fn hop_must_stay_https_and_allowed() {
            let policy = HostPolicy::new().with_allowed_domains(["example.com"]);
            let insecure = check_redirect(&policy, &url("http://cal.example.com/a.ics"), 1, 3).unwrap_err();
            assert_eq!(insecure.message(), "Only HTTPS URLs are allowed.");

            let elsewhere = check_redirect(&policy, &url("https://example.net/a.ics"), 1, 3).unwrap_err();
            assert_eq!(elsewhere.message(), "Host is not in the allowed domains whitelist.");
        }

        #[test]
        fn limit_is_enforced() {
            let policy = HostPolicy::new();
            let next = url("https://cdn.example.com/a.ics");
            assert!(check_redirect(&policy, &next, 3, 3).is_ok());

            let err = check_redirect(&policy, &next, 4, 3).unwrap_err();
            assert_eq!(err.code(), FeedErrorCode::RequestFailed);
        }
    }

    #[test]
    fn client_builds_from_config() {
        let source = HttpFeedSource::new(&FeedConfig::new(UTC)).unwrap();
        assert_eq!(source.name(), "http");
    }
}
