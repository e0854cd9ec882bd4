//! Error types for Sitegrab

use thiserror::Error;

/// Errors raised by a [`PageFetcher`](crate::PageFetcher)
#[derive(Debug, Error)]
pub enum FetchError {
    /// URL has invalid scheme
    #[error("Invalid URL: must start with http:// or https://")]
    InvalidUrlScheme,

    /// Failed to build HTTP client
    #[error("Failed to create HTTP client")]
    ClientBuildError(#[source] reqwest::Error),

    /// Request timed out
    #[error("Request timed out")]
    Timeout,

    /// Failed to connect to server
    #[error("Failed to connect to server")]
    ConnectError(#[source] reqwest::Error),

    /// Server answered with a non-success status
    #[error("HTTP {status} for {url}")]
    HttpStatus { url: String, status: u16 },

    /// Server answered with content that cannot be treated as text
    #[error("Binary content ({content_type}) at {url}")]
    BinaryContent { url: String, content_type: String },

    /// Other request error
    #[error("Request failed: {0}")]
    RequestError(String),
}

impl FetchError {
    /// Create an error from a reqwest error
    pub fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout
        } else if err.is_connect() {
            FetchError::ConnectError(err)
        } else {
            FetchError::RequestError(err.to_string())
        }
    }

    /// True for failures the crawler treats as a page without links
    pub fn is_dead_end(&self) -> bool {
        matches!(
            self,
            FetchError::HttpStatus { .. } | FetchError::BinaryContent { .. }
        )
    }

    /// True for failures worth retrying
    pub fn is_transient(&self) -> bool {
        match self {
            FetchError::Timeout | FetchError::ConnectError(_) => true,
            FetchError::HttpStatus { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

/// Errors raised by a [`Converter`](crate::Converter)
#[derive(Debug, Error)]
pub enum ConvertError {
    /// No API key configured
    #[error("Missing API key for conversion service")]
    MissingApiKey,

    /// Failed to build HTTP client
    #[error("Failed to create HTTP client")]
    ClientBuildError(#[source] reqwest::Error),

    /// Conversion service rejected the request
    #[error("Conversion service error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    /// Transport failure talking to the conversion service
    #[error("Conversion request failed: {0}")]
    Request(String),

    /// Response body did not have the expected shape
    #[error("Invalid response from conversion service: {0}")]
    InvalidResponse(String),

    /// Response carried no text output
    #[error("Conversion service returned no text output")]
    EmptyOutput,
}

/// Crate-level error
#[derive(Debug, Error)]
pub enum Error {
    /// Input is not a usable absolute URL
    #[error("Invalid URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// Fetching a page failed
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// Converting a page failed
    #[error(transparent)]
    Convert(#[from] ConvertError),

    /// Reading or writing local files failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
