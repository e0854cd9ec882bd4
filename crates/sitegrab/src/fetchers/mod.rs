//! Page fetchers
//!
//! Design: the crawler and the conversion driver never talk HTTP directly.
//! They go through a [`PageFetcher`], so tests and embedders can swap in
//! their own source of page content.

mod http;

pub use http::HttpFetcher;

use crate::error::FetchError;
use async_trait::async_trait;
use url::Url;

/// Source of raw page content
///
/// Implementations return the page body for a successful fetch.
/// A non-success response must be reported as [`FetchError::HttpStatus`]
/// so the crawler can tell a dead link from a broken network.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Identifier for logging
    fn name(&self) -> &'static str;

    /// Fetch the raw content at `url`
    async fn fetch(&self, url: &Url) -> Result<String, FetchError>;
}
