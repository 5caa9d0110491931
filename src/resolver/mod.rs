//! Title resolution
//!
//! This module maps a human-readable title ("Original Name (Year)") to an
//! IMDb title id by querying the IMDb search page, with results kept in a
//! [`TitleCache`] so that repeated titles are looked up once.

mod cache;
mod parser;

pub use cache::{CacheError, CacheResult, MemoryCache, TitleCache};
pub use parser::{extract_title_id, title_id_from_href};

use crate::crawler::{FetchError, Fetcher};
use crate::domain::TitleId;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Errors that can occur while resolving a title
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error(transparent)]
    Fetch(FetchError),

    #[error("invalid search result selector: {0}")]
    Selector(String),

    #[error("no search result items found")]
    NoItem,

    #[error("search result has no link")]
    NoHref,

    #[error("search result link '{0}' is not a title link")]
    NotTitleLink(String),

    #[error("no title id in link '{0}'")]
    NoId(String),

    #[error("'{0}' is not an IMDb title id")]
    InvalidId(TitleId),

    #[error("title lookup cancelled")]
    Cancelled,
}

impl From<FetchError> for ResolveError {
    fn from(e: FetchError) -> Self {
        match e {
            FetchError::Cancelled => Self::Cancelled,
            other => Self::Fetch(other),
        }
    }
}

/// Capability to find the IMDb id of a title
#[async_trait]
pub trait TitleResolver: Send + Sync {
    async fn get_id_by_title(
        &self,
        title: &str,
        cancel: &CancellationToken,
    ) -> Result<TitleId, ResolveError>;
}

/// Resolver backed by the IMDb search page
pub struct ImdbResolver {
    fetcher: Arc<dyn Fetcher>,
    cache: Arc<dyn TitleCache>,
    find_url: Url,
}

impl ImdbResolver {
    /// Creates a resolver
    ///
    /// # Arguments
    ///
    /// * `fetcher` - Fetcher used for search pages
    /// * `cache` - Cache consulted before and filled after each lookup
    /// * `find_url` - Search endpoint, e.g. `https://www.imdb.com/find/`
    pub fn new(fetcher: Arc<dyn Fetcher>, cache: Arc<dyn TitleCache>, find_url: Url) -> Self {
        Self {
            fetcher,
            cache,
            find_url,
        }
    }
}

#[async_trait]
impl TitleResolver for ImdbResolver {
    async fn get_id_by_title(
        &self,
        title: &str,
        cancel: &CancellationToken,
    ) -> Result<TitleId, ResolveError> {
        if let Some(id) = self.cache.get_title_id(title) {
            tracing::debug!(%title, %id, "IMDb ID found in cache");
            return Ok(id);
        }

        if cancel.is_cancelled() {
            return Err(ResolveError::Cancelled);
        }

        let url = search_url(&self.find_url, title);
        let body = self.fetcher.fetch(url.as_str(), cancel).await?;

        if cancel.is_cancelled() {
            return Err(ResolveError::Cancelled);
        }

        let id = extract_title_id(&body)?;
        if !id.is_valid() {
            return Err(ResolveError::InvalidId(id));
        }
        tracing::debug!(%title, %id, "IMDb ID resolved");

        self.cache.store_title_id(title, id.clone());

        Ok(id)
    }
}

/// Builds the search URL for a title
///
/// Any query already present on `find_url` is replaced.
///
/// # Example
///
/// ```
/// use kpvotes::resolver::search_url;
/// use url::Url;
///
/// let find = Url::parse("https://www.imdb.com/find/").unwrap();
/// let url = search_url(&find, "Solaris (1972)");
/// assert_eq!(url.as_str(), "https://www.imdb.com/find/?s=all&q=Solaris+%281972%29");
/// ```
pub fn search_url(find_url: &Url, title: &str) -> Url {
    let mut url = find_url.clone();
    url.query_pairs_mut()
        .clear()
        .append_pair("s", "all")
        .append_pair("q", title);
    url
}
