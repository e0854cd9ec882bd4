//! Scoped site crawler
//!
//! The crawl is a traversal of the link graph rooted at the seed. Pages
//! are expanded from an explicit stack instead of recursion, and a visited
//! set owned by the traversal loop guarantees every page is expanded at
//! most once, which is what makes cyclic sites terminate.
//!
//! Only the seed honors `include_same_level`. Every page discovered from
//! it is expanded in descendants-only mode, so pages beside a non-seed page
//! are never pulled in from that page.

use crate::canonical::{parse_absolute, CanonicalUrl};
use crate::error::Error;
use crate::fetchers::{HttpFetcher, PageFetcher};
use crate::links::LinkExtractor;
use futures::stream::{FuturesUnordered, StreamExt};
use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;
use tracing::{debug, info};
use url::Url;

/// Crawl options
#[derive(Debug, Clone)]
pub struct CrawlOptions {
    /// Follow same-directory links from the seed page
    pub include_same_level: bool,
    /// Maximum number of pages being expanded at once
    pub concurrency: usize,
}

impl Default for CrawlOptions {
    fn default() -> Self {
        Self {
            include_same_level: false,
            concurrency: 1,
        }
    }
}

/// Builder for [`Crawler`]
#[derive(Default)]
pub struct CrawlerBuilder {
    options: CrawlOptions,
    fetcher: Option<Arc<dyn PageFetcher>>,
}

impl CrawlerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Follow same-directory links from the seed page
    pub fn include_same_level(mut self, include: bool) -> Self {
        self.options.include_same_level = include;
        self
    }

    /// Limit concurrent page expansions (values below 1 are treated as 1)
    pub fn concurrency(mut self, limit: usize) -> Self {
        self.options.concurrency = limit.max(1);
        self
    }

    /// Use a custom page fetcher
    pub fn fetcher(mut self, fetcher: Arc<dyn PageFetcher>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    /// Build the crawler, creating a default [`HttpFetcher`] if none was set
    pub fn build(self) -> Result<Crawler, Error> {
        let fetcher = match self.fetcher {
            Some(fetcher) => fetcher,
            None => Arc::new(HttpFetcher::new()?),
        };
        Ok(Crawler {
            extractor: LinkExtractor::new(fetcher),
            options: self.options,
        })
    }
}

/// Configured crawler
#[derive(Clone)]
pub struct Crawler {
    extractor: LinkExtractor,
    options: CrawlOptions,
}

impl Crawler {
    pub fn builder() -> CrawlerBuilder {
        CrawlerBuilder::new()
    }

    pub fn options(&self) -> &CrawlOptions {
        &self.options
    }

    /// Crawl from `seed` and return every in-scope URL discovered
    ///
    /// The result always contains the canonical seed. A seed that answers
    /// with an error status yields just the seed. The seed page itself is
    /// fetched with its query string, every other page by canonical URL.
    pub async fn crawl(&self, seed: &str) -> Result<BTreeSet<CanonicalUrl>, Error> {
        let mut seed_page = parse_absolute(seed)?;
        seed_page.set_fragment(None);
        let seed = CanonicalUrl::from_url(seed_page.clone());
        info!(seed = %seed, include_same_level = self.options.include_same_level, "Starting crawl");

        let limit = self.options.concurrency.max(1);
        let mut visited: HashSet<CanonicalUrl> = HashSet::new();
        let mut found: BTreeSet<CanonicalUrl> = BTreeSet::from([seed.clone()]);
        // (canonical url, url to fetch, include_same_level)
        let mut pending: Vec<(CanonicalUrl, Url, bool)> =
            vec![(seed, seed_page, self.options.include_same_level)];
        let mut in_flight = FuturesUnordered::new();

        loop {
            while in_flight.len() < limit {
                let Some((url, page, include_same_level)) = pending.pop() else {
                    break;
                };
                // Check-and-mark happens here, before the page is fetched
                if !visited.insert(url.clone()) {
                    continue;
                }
                let extractor = self.extractor.clone();
                in_flight.push(async move {
                    let links = extractor.extract_links_at(&page, include_same_level).await;
                    (url, links)
                });
            }

            let Some((url, links)) = in_flight.next().await else {
                break;
            };
            let links = links?;
            debug!(url = %url, discovered = links.len(), "Expanded page");

            // Reverse so the stack pops links in sorted order
            for link in links.into_iter().rev() {
                if !visited.contains(&link) {
                    pending.push((link.clone(), link.as_url().clone(), false));
                }
                found.insert(link);
            }
        }

        info!(pages = found.len(), expanded = visited.len(), "Crawl finished");
        Ok(found)
    }
}
