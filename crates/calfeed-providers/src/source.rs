//! FeedSource trait definition.
//!
//! A [`FeedSource`] turns a feed URL into raw ICS text. The HTTP
//! implementation lives in [`crate::http`]; tests substitute in-memory
//! sources.

use std::future::Future;
use std::pin::Pin;

use crate::error::FeedResult;

/// A boxed future for async trait methods.
///
/// Boxed futures keep the traits object-safe so fetchers can hold
/// `Arc<dyn FeedSource>`.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Something that can download a calendar feed.
///
/// # Example Implementation
///
/// ```ignore
/// struct FixedSource(String);
///
/// impl FeedSource for FixedSource {
///     fn name(&self) -> &str { "fixed" }
///
///     fn fetch<'a>(&'a self, _url: &'a str) -> BoxFuture<'a, FeedResult<String>> {
///         Box::pin(async move { Ok(self.0.clone()) })
///     }
/// }
/// ```
pub trait FeedSource: Send + Sync {
    /// Returns the name of this source, used in logs.
    fn name(&self) -> &str;

    /// Downloads the feed at `url`.
    ///
    /// # Errors
    ///
    /// Returns `request_failed`, `bad_status` or `empty_response` errors.
    fn fetch<'a>(&'a self, url: &'a str) -> BoxFuture<'a, FeedResult<String>>;
}
