//! Link discovery for a single page

use crate::canonical::CanonicalUrl;
use crate::error::Error;
use crate::fetchers::PageFetcher;
use crate::scope::is_in_scope;
use scraper::{ElementRef, Html};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, warn};
use url::Url;

/// Raw `href` values of every `<a>` element, in document order
pub fn parse_hrefs(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    document
        .root_element()
        .descendants()
        .filter_map(ElementRef::wrap)
        .filter(|element| element.value().name() == "a")
        .filter_map(|element| element.value().attr("href"))
        .map(|href| href.to_string())
        .collect()
}

/// Resolve, canonicalize and scope-filter raw hrefs found on `base`
pub fn filter_links<I, S>(base: &CanonicalUrl, hrefs: I, include_same_level: bool) -> BTreeSet<CanonicalUrl>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    hrefs
        .into_iter()
        .filter_map(|href| base.join(href.as_ref()))
        .filter(|link| is_in_scope(base, link, include_same_level))
        .collect()
}

/// Fetches a page and returns its in-scope outbound links
#[derive(Clone)]
pub struct LinkExtractor {
    fetcher: Arc<dyn PageFetcher>,
}

impl LinkExtractor {
    pub fn new(fetcher: Arc<dyn PageFetcher>) -> Self {
        Self { fetcher }
    }

    /// Extract in-scope links from the page at `base`
    ///
    /// A page that answers with an error status (or binary content) is a
    /// dead end: the result is an empty set, not an error. Any other fetch
    /// failure is returned to the caller.
    pub async fn extract_links(
        &self,
        base: &CanonicalUrl,
        include_same_level: bool,
    ) -> Result<BTreeSet<CanonicalUrl>, Error> {
        self.extract_links_at(base.as_url(), include_same_level).await
    }

    /// Like [`extract_links`](Self::extract_links), but fetches `page` as
    /// given, query string included; scope is judged on its canonical form
    pub async fn extract_links_at(
        &self,
        page: &Url,
        include_same_level: bool,
    ) -> Result<BTreeSet<CanonicalUrl>, Error> {
        let base = CanonicalUrl::from_url(page.clone());
        debug!(url = %page, include_same_level, fetcher = self.fetcher.name(), "Extracting links");

        let html = match self.fetcher.fetch(page).await {
            Ok(html) => html,
            Err(e) if e.is_dead_end() => {
                warn!(url = %page, error = %e, "Page unavailable, treating as dead end");
                return Ok(BTreeSet::new());
            }
            Err(e) => return Err(e.into()),
        };

        let hrefs = parse_hrefs(&html);
        let links = filter_links(&base, &hrefs, include_same_level);
        debug!(url = %page, anchors = hrefs.len(), in_scope = links.len(), "Links extracted");
        Ok(links)
    }
}
