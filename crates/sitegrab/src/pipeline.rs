//! Conversion driver
//!
//! Fetches pages and runs them through a [`Converter`]. Conversions run
//! concurrently and may finish in any order; results are always returned
//! in the order the URLs were given. The first failure aborts the batch.

use crate::canonical::parse_absolute;
use crate::convert::Converter;
use crate::crawler::Crawler;
use crate::error::{Error, FetchError};
use crate::fetchers::PageFetcher;
use futures::stream::{self, StreamExt, TryStreamExt};
use std::sync::Arc;
use tracing::{debug, info, warn};
use url::Url;

/// Separator placed between converted documents
pub const DOCUMENT_SEPARATOR: &str = "\n\n";

/// Conversion options
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// Maximum number of pages fetched and converted at once
    pub concurrency: usize,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self { concurrency: 8 }
    }
}

/// Fetch + convert driver
#[derive(Clone)]
pub struct Pipeline {
    fetcher: Arc<dyn PageFetcher>,
    converter: Arc<dyn Converter>,
    options: ConvertOptions,
}

impl Pipeline {
    pub fn new(fetcher: Arc<dyn PageFetcher>, converter: Arc<dyn Converter>) -> Self {
        Self {
            fetcher,
            converter,
            options: ConvertOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ConvertOptions) -> Self {
        self.options = options;
        self
    }

    /// Fetch one page and convert it; fetch errors propagate
    pub async fn fetch_and_convert(&self, url: &Url) -> Result<String, Error> {
        debug!(url = %url, converter = self.converter.name(), "Converting");
        let content = self.fetcher.fetch(url).await?;
        let text = self.converter.convert(&content).await?;
        Ok(text)
    }

    /// Convert every URL, returning documents in input order
    ///
    /// All URLs are validated before any request is made.
    pub async fn convert_urls<S: AsRef<str>>(&self, urls: &[S]) -> Result<Vec<String>, Error> {
        let urls = urls
            .iter()
            .map(|u| parse_absolute(u.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        self.convert_parsed(urls, false).await
    }

    /// Crawl from `seed`, then convert every discovered page in sorted order
    ///
    /// Pages serving binary content are skipped. Any other failure aborts.
    pub async fn harvest(&self, crawler: &Crawler, seed: &str) -> Result<Vec<String>, Error> {
        let pages = crawler.crawl(seed).await?;
        info!(seed, pages = pages.len(), "Extracted URLs, converting");
        let urls = pages.into_iter().map(|page| page.into_url()).collect();
        self.convert_parsed(urls, true).await
    }

    async fn convert_page(&self, url: &Url, skip_binary: bool) -> Result<Option<String>, Error> {
        match self.fetch_and_convert(url).await {
            Ok(text) => Ok(Some(text)),
            Err(Error::Fetch(e @ FetchError::BinaryContent { .. })) if skip_binary => {
                warn!(url = %url, error = %e, "Skipping binary page");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    async fn convert_parsed(&self, urls: Vec<Url>, skip_binary: bool) -> Result<Vec<String>, Error> {
        let converted: Vec<Option<String>> = stream::iter(urls.iter())
            .map(|url| self.convert_page(url, skip_binary))
            .buffered(self.options.concurrency.max(1))
            .try_collect()
            .await?;
        let docs: Vec<String> = converted.into_iter().flatten().collect();
        info!(pages = urls.len(), documents = docs.len(), "Conversion finished");
        Ok(docs)
    }
}

/// Join converted documents with a blank line between them
pub fn join_documents(docs: &[String]) -> String {
    docs.join(DOCUMENT_SEPARATOR)
}
