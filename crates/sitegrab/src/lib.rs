//! Sitegrab - scoped website crawler with Markdown conversion
//!
//! This crate discovers every page at or below a seed URL's directory and
//! converts pages to Markdown through a language model.
//!
//! ## Scope
//!
//! A link is followed when it keeps the page's scheme and authority and its
//! directory is nested below the directory of the page it was found on.
//! Links to files in the *same* directory are followed from the seed only,
//! and only when asked for (`include_same_level`).
//!
//! ## Collaborators
//!
//! - [`PageFetcher`] - source of raw page content ([`HttpFetcher`] by default)
//! - [`Converter`] - content to Markdown ([`OpenAiConverter`])
//!
//! ```no_run
//! # async fn run() -> Result<(), sitegrab::Error> {
//! let urls = sitegrab::crawl("https://example.com/docs/index.html", false).await?;
//! for url in &urls {
//!     println!("{}", url);
//! }
//! # Ok(())
//! # }
//! ```

mod canonical;
pub mod client;
pub mod convert;
mod crawler;
mod error;
pub mod fetchers;
mod links;
pub mod pipeline;
mod scope;

pub use canonical::{normalize, parse_absolute, CanonicalUrl};
pub use client::{convert_urls, crawl, FetchOptions};
pub use convert::{Converter, ConverterConfig, OpenAiConverter};
pub use crawler::{CrawlOptions, Crawler, CrawlerBuilder};
pub use error::{ConvertError, Error, FetchError};
pub use fetchers::{HttpFetcher, PageFetcher};
pub use links::{filter_links, parse_hrefs, LinkExtractor};
pub use pipeline::{join_documents, ConvertOptions, Pipeline, DOCUMENT_SEPARATOR};
pub use scope::{classify, is_in_scope, Scope};

/// Default User-Agent string
pub const DEFAULT_USER_AGENT: &str = "Sitegrab/0.1";
