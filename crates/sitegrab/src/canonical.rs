//! Canonical URL form
//!
//! A canonical URL keeps only scheme, host (with any userinfo or explicit
//! port) and path. Query strings and fragments are dropped, so
//! `page.html?a=1#top` and `page.html` are the same page to the crawler.

use crate::error::Error;
use std::fmt;
use std::str::FromStr;
use url::Url;

/// URL reduced to `scheme://host/path`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CanonicalUrl(Url);

impl CanonicalUrl {
    /// Canonicalize an already parsed URL
    pub fn from_url(mut url: Url) -> Self {
        url.set_query(None);
        url.set_fragment(None);
        Self(url)
    }

    /// Serialized form
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Underlying parsed URL
    pub fn as_url(&self) -> &Url {
        &self.0
    }

    pub fn scheme(&self) -> &str {
        self.0.scheme()
    }

    /// Authority used for same-origin checks: userinfo, host and explicit port
    pub fn authority(&self) -> Option<String> {
        let host = self.0.host_str()?;
        let mut authority = String::new();
        if !self.0.username().is_empty() || self.0.password().is_some() {
            authority.push_str(self.0.username());
            if let Some(password) = self.0.password() {
                authority.push(':');
                authority.push_str(password);
            }
            authority.push('@');
        }
        authority.push_str(host);
        if let Some(port) = self.0.port() {
            authority.push(':');
            authority.push_str(&port.to_string());
        }
        Some(authority)
    }

    pub fn path(&self) -> &str {
        self.0.path()
    }

    /// Resolve a (possibly relative) reference against this URL
    pub fn join(&self, reference: &str) -> Option<CanonicalUrl> {
        self.0.join(reference).ok().map(Self::from_url)
    }

    pub fn into_url(self) -> Url {
        self.0
    }
}

/// Parse an absolute URL, keeping query and fragment
pub fn parse_absolute(url: &str) -> Result<Url, Error> {
    Url::parse(url).map_err(|source| Error::InvalidUrl {
        url: url.to_string(),
        source,
    })
}

/// Parse and canonicalize an absolute URL
pub fn normalize(url: &str) -> Result<CanonicalUrl, Error> {
    parse_absolute(url).map(CanonicalUrl::from_url)
}

impl FromStr for CanonicalUrl {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        normalize(s)
    }
}

impl fmt::Display for CanonicalUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AsRef<str> for CanonicalUrl {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl From<CanonicalUrl> for String {
    fn from(url: CanonicalUrl) -> Self {
        url.0.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_query_and_fragment() {
        let url = normalize("https://example.com/docs/page.html?lang=en#intro").unwrap();
        assert_eq!(url.as_str(), "https://example.com/docs/page.html");
    }

    #[test]
    fn test_keeps_port_and_path() {
        let url = normalize("http://127.0.0.1:8080/a/b/").unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:8080/a/b/");
        assert_eq!(url.authority(), Some("127.0.0.1:8080".to_string()));
        assert_eq!(url.path(), "/a/b/");
    }

    #[test]
    fn test_default_port_is_dropped() {
        let url = normalize("https://example.com:443/x").unwrap();
        assert_eq!(url.as_str(), "https://example.com/x");
        assert_eq!(url.authority(), Some("example.com".to_string()));
    }

    #[test]
    fn test_authority_includes_userinfo() {
        let url = normalize("https://user:pw@example.com:8443/x").unwrap();
        assert_eq!(url.authority(), Some("user:pw@example.com:8443".to_string()));
        let url = normalize("https://user@example.com/x").unwrap();
        assert_eq!(url.authority(), Some("user@example.com".to_string()));
    }

    #[test]
    fn test_empty_path_becomes_root() {
        let url = normalize("http://example.com").unwrap();
        assert_eq!(url.as_str(), "http://example.com/");
    }

    #[test]
    fn test_idempotent() {
        let inputs = [
            "https://example.com/docs/page.html?lang=en#intro",
            "http://Example.COM/A/./b/../c.html",
            "http://example.com",
            "https://user:pw@example.com:8443/x/y/?q#f",
        ];
        for input in inputs {
            let once = normalize(input).unwrap();
            let twice = normalize(once.as_str()).unwrap();
            assert_eq!(once, twice, "normalize not idempotent for {}", input);
        }
    }

    #[test]
    fn test_query_variants_compare_equal() {
        let a = normalize("http://x/page.html?a=1").unwrap();
        let b = normalize("http://x/page.html#section").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_invalid_url_is_an_error() {
        assert!(matches!(
            normalize("/relative/path"),
            Err(Error::InvalidUrl { .. })
        ));
        assert!(matches!(normalize(""), Err(Error::InvalidUrl { .. })));
        assert!(matches!(
            normalize("http://"),
            Err(Error::InvalidUrl { .. })
        ));
    }

    #[test]
    fn test_join_resolves_relative_references() {
        let base = normalize("http://x/docs/index.html").unwrap();
        assert_eq!(
            base.join("sub/page.html?x=1").unwrap().as_str(),
            "http://x/docs/sub/page.html"
        );
        assert_eq!(base.join("../top.html").unwrap().as_str(), "http://x/top.html");
        assert_eq!(base.join("/abs.html").unwrap().as_str(), "http://x/abs.html");
        assert_eq!(
            base.join("https://other.com/z").unwrap().as_str(),
            "https://other.com/z"
        );
    }

    #[test]
    fn test_from_str_and_display() {
        let url: CanonicalUrl = "http://x/a.html#frag".parse().unwrap();
        assert_eq!(url.to_string(), "http://x/a.html");
        let s: String = url.into();
        assert_eq!(s, "http://x/a.html");
    }
}
