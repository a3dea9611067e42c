//! Error types for command tree discovery.
//!
//! One error type covers every failure the discovery pipeline can surface:
//! fetching documents, reading pages that break the documentation
//! convention, assembling the path trie, and config/serialization I/O.

use thiserror::Error;

/// Errors that can occur while discovering a command tree.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// The HTTP request for a document failed before a response arrived.
    #[error("failed to fetch {url}: {source}")]
    Fetch {
        /// Requested URL.
        url: String,
        /// Underlying client error.
        #[source]
        source: reqwest::Error,
    },

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("failed to fetch {url}: HTTP {status}")]
    HttpStatus {
        /// Requested URL.
        url: String,
        /// Response status code.
        status: u16,
    },

    /// No document is available for the URL (in-memory sources).
    #[error("document not found: {0}")]
    DocumentNotFound(String),

    /// An element the page convention requires is missing.
    #[error("malformed document: {0}")]
    MalformedDocument(String),

    /// A record would turn a leaf into a group or a group into a leaf.
    #[error("path conflict at '{0}': leaf and group share a path")]
    PathConflict(String),

    /// A URL could not be parsed or resolved.
    #[error("invalid URL '{url}': {source}")]
    InvalidUrl {
        /// Offending input.
        url: String,
        /// Parser error.
        #[source]
        source: url::ParseError,
    },

    /// A tree package failed validation.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Invalid or missing input (e.g. non-existent path, wrong extension).
    #[error("{0}")]
    InvalidInput(String),

    /// Filesystem I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing or serialization failure.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing or serialization failure.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Convenience alias for results with [`DiscoveryError`].
pub type Result<T> = std::result::Result<T, DiscoveryError>;

/// Parses `raw` into a [`url::Url`], keeping the input in the error.
pub(crate) fn parse_url(raw: &str) -> Result<url::Url> {
    url::Url::parse(raw).map_err(|source| DiscoveryError::InvalidUrl {
        url: raw.to_string(),
        source,
    })
}

/// Resolves `href` against `base`, keeping the input in the error.
pub(crate) fn join_url(base: &url::Url, href: &str) -> Result<url::Url> {
    base.join(href).map_err(|source| DiscoveryError::InvalidUrl {
        url: href.to_string(),
        source,
    })
}
