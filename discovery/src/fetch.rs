//! Document retrieval.
//!
//! The pipeline reads every page through [`DocumentFetcher`], so the network
//! client can be swapped for an in-memory source in tests or offline runs.
//! There is no retry or backoff here: a failed fetch is reported as is.

use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;
use url::Url;

use crate::error::{DiscoveryError, Result};

/// Retrieves raw document text for a URL.
#[async_trait]
pub trait DocumentFetcher: Send + Sync {
    /// Fetches the document at `url`.
    ///
    /// # Errors
    ///
    /// Any transport failure or non-success status.
    async fn fetch(&self, url: &Url) -> Result<String>;
}

/// HTTP fetcher backed by [`reqwest`].
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Creates a fetcher sending `user_agent` with every request.
    pub fn new(user_agent: &str) -> Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .build()
            .map_err(DiscoveryError::HttpClient)?;
        Ok(Self { client })
    }
}

#[async_trait]
impl DocumentFetcher for HttpFetcher {
    async fn fetch(&self, url: &Url) -> Result<String> {
        debug!(%url, "Fetching document");
        let to_fetch_error = |source| DiscoveryError::Fetch {
            url: url.to_string(),
            source,
        };

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(to_fetch_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(DiscoveryError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let text = response.text().await.map_err(to_fetch_error)?;
        debug!(%url, chars = text.len(), "Fetched document");
        Ok(text)
    }
}

/// In-memory fetcher serving pre-captured pages.
///
/// Documents are keyed by URL with the fragment removed, so
/// `vm?view=latest#az-vm-create` and `vm?view=latest` hit the same page.
///
/// # Examples
///
/// ```
/// use cmdtree_discovery::fetch::{DocumentFetcher, StaticFetcher};
///
/// let fetcher = StaticFetcher::new()
///     .with_document("https://docs.example.test/cli/vm", "<h1>az vm</h1>");
/// let url = url::Url::parse("https://docs.example.test/cli/vm#az-vm-create").unwrap();
///
/// let text = futures::executor::block_on(fetcher.fetch(&url)).unwrap();
/// assert_eq!(text, "<h1>az vm</h1>");
/// ```
#[derive(Debug, Clone, Default)]
pub struct StaticFetcher {
    documents: HashMap<String, String>,
}

impl StaticFetcher {
    /// Creates an empty fetcher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a document served for `url`.
    pub fn with_document(mut self, url: &str, text: impl Into<String>) -> Self {
        self.insert(url, text);
        self
    }

    /// Adds or replaces the document served for `url`.
    pub fn insert(&mut self, url: &str, text: impl Into<String>) {
        let key = match Url::parse(url) {
            Ok(parsed) => strip_fragment(parsed.as_str()),
            Err(_) => strip_fragment(url),
        };
        self.documents.insert(key, text.into());
    }
}

#[async_trait]
impl DocumentFetcher for StaticFetcher {
    async fn fetch(&self, url: &Url) -> Result<String> {
        let key = strip_fragment(url.as_str());
        self.documents
            .get(&key)
            .cloned()
            .ok_or(DiscoveryError::DocumentNotFound(key))
    }
}

fn strip_fragment(url: &str) -> String {
    match url.split_once('#') {
        Some((head, _)) => head.to_string(),
        None => url.to_string(),
    }
}
