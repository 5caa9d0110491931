//! Fixture-backed fetcher
//!
//! Serves page bodies from local files keyed by URL. Used by tests and for
//! replaying saved pages without network access.

use crate::crawler::fetcher::{FetchError, Fetcher};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};
use tokio_util::sync::CancellationToken;

/// Fetcher that maps URLs to local files
#[derive(Debug, Default)]
pub struct FixtureFetcher {
    sources: HashMap<String, PathBuf>,
    requested: Mutex<Vec<String>>,
}

impl FixtureFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a file served for the exact URL
    pub fn with_page(mut self, url: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        self.sources.insert(url.into(), path.into());
        self
    }

    /// URLs requested so far, in request order
    pub fn requested(&self) -> Vec<String> {
        self.requested
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl Fetcher for FixtureFetcher {
    async fn fetch(&self, url: &str, cancel: &CancellationToken) -> Result<String, FetchError> {
        if cancel.is_cancelled() {
            return Err(FetchError::Cancelled);
        }

        self.requested
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(url.to_string());

        let path = self.sources.get(url).ok_or_else(|| FetchError::NotFound {
            url: url.to_string(),
        })?;

        tokio::fs::read_to_string(path)
            .await
            .map_err(|source| FetchError::Fixture {
                path: path.clone(),
                source,
            })
    }
}
