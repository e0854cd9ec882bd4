//! Entry points for Sitegrab
//!
//! Convenience wrappers over [`Crawler`] and [`Pipeline`] using the default
//! [`HttpFetcher`]. For custom fetchers or converters, build those types
//! directly.

use crate::canonical::CanonicalUrl;
use crate::convert::{ConverterConfig, OpenAiConverter};
use crate::crawler::Crawler;
use crate::error::Error;
use crate::fetchers::HttpFetcher;
use crate::pipeline::Pipeline;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

/// Request timeout for page fetches
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Delay before the first retry; doubled on each further attempt
const DEFAULT_RETRY_BACKOFF: Duration = Duration::from_millis(500);

/// Options for [`HttpFetcher`]
#[derive(Debug, Clone)]
pub struct FetchOptions {
    /// Custom User-Agent
    pub user_agent: Option<String>,
    /// Connect and total request timeout
    pub timeout: Duration,
    /// Extra attempts for timeouts, connect errors and 5xx responses
    pub retries: u32,
    /// Delay before the first retry
    pub retry_backoff: Duration,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            user_agent: None,
            timeout: DEFAULT_TIMEOUT,
            retries: 0,
            retry_backoff: DEFAULT_RETRY_BACKOFF,
        }
    }
}

/// Crawl from `seed` over HTTP and return every in-scope URL
pub async fn crawl(seed: &str, include_same_level: bool) -> Result<BTreeSet<CanonicalUrl>, Error> {
    let crawler = Crawler::builder()
        .include_same_level(include_same_level)
        .build()?;
    crawler.crawl(seed).await
}

/// Fetch each URL over HTTP and convert it to Markdown, in input order
pub async fn convert_urls<S: AsRef<str>>(urls: &[S], config: ConverterConfig) -> Result<Vec<String>, Error> {
    let pipeline = Pipeline::new(
        Arc::new(HttpFetcher::new()?),
        Arc::new(OpenAiConverter::new(config)?),
    );
    pipeline.convert_urls(urls).await
}
