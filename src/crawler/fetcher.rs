//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the exporter, including:
//! - Building the HTTP client with user agent, headers, timeouts and proxy
//! - GET requests returning the page body
//! - Cancellation of in-flight requests
//! - Error classification
//!
//! No retries are made: a failed request is reported to the caller as is.

use crate::config::HttpConfig;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use reqwest::{Client, Proxy, StatusCode};
use std::path::PathBuf;
use std::sync::{PoisonError, RwLock};
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Errors that can occur while fetching a page
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("page URL '{url}' is invalid: {source}")]
    InvalidUrl { url: String, source: url::ParseError },

    #[error("request to '{url}' failed: {source}")]
    Request { url: String, source: reqwest::Error },

    #[error("got non-OK response from '{url}': {status}")]
    Status { url: String, status: u16 },

    #[error("page {url} not found in fixtures")]
    NotFound { url: String },

    #[error("failed to read fixture file {path}: {source}")]
    Fixture {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("fetcher is closed")]
    Closed,

    #[error("fetch cancelled")]
    Cancelled,
}

impl FetchError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// Capability to download a page body by absolute URL
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Downloads the page body
    ///
    /// Implementations must return `FetchError::Cancelled` as soon as the
    /// token is cancelled.
    async fn fetch(&self, url: &str, cancel: &CancellationToken) -> Result<String, FetchError>;

    /// Releases pooled connections; later fetches may fail with `FetchError::Closed`
    fn close(&self) {}
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The HTTP configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client (e.g. invalid proxy)
///
/// # Example
///
/// ```no_run
/// use kpvotes::config::HttpConfig;
/// use kpvotes::crawler::build_http_client;
///
/// let client = build_http_client(&HttpConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &HttpConfig) -> Result<Client, reqwest::Error> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("text/html"));
    match HeaderValue::from_str(&config.accept_language) {
        Ok(value) => {
            headers.insert(ACCEPT_LANGUAGE, value);
        }
        Err(_) => tracing::warn!(
            "Ignoring invalid Accept-Language value: {}",
            config.accept_language
        ),
    }

    let mut builder = Client::builder()
        .user_agent(config.user_agent.as_str())
        .default_headers(headers)
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true);

    if let Some(proxy_url) = &config.proxy_url {
        // Intercepting proxies re-sign TLS traffic with their own certificates
        builder = builder
            .proxy(Proxy::all(proxy_url.as_str())?)
            .danger_accept_invalid_certs(true);
    }

    builder.build()
}

/// Fetcher backed by a pooled `reqwest` client
#[derive(Debug)]
pub struct HttpFetcher {
    client: RwLock<Option<Client>>,
}

impl HttpFetcher {
    /// Creates a fetcher from the HTTP configuration
    pub fn new(config: &HttpConfig) -> Result<Self, reqwest::Error> {
        Ok(Self::with_client(build_http_client(config)?))
    }

    /// Creates a fetcher around an existing client
    pub fn with_client(client: Client) -> Self {
        Self {
            client: RwLock::new(Some(client)),
        }
    }

    fn client(&self) -> Option<Client> {
        self.client
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str, cancel: &CancellationToken) -> Result<String, FetchError> {
        if cancel.is_cancelled() {
            return Err(FetchError::Cancelled);
        }

        let page_url = Url::parse(url).map_err(|source| FetchError::InvalidUrl {
            url: url.to_string(),
            source,
        })?;

        let client = self.client().ok_or(FetchError::Closed)?;

        tracing::debug!(url, "Sending request");

        let response = tokio::select! {
            result = client.get(page_url).send() => result.map_err(|source| FetchError::Request {
                url: url.to_string(),
                source,
            })?,
            _ = cancel.cancelled() => return Err(FetchError::Cancelled),
        };

        let status = response.status();
        if status != StatusCode::OK {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = tokio::select! {
            result = response.text() => result.map_err(|source| FetchError::Request {
                url: url.to_string(),
                source,
            })?,
            _ = cancel.cancelled() => return Err(FetchError::Cancelled),
        };

        tracing::debug!(url, bytes = body.len(), "Downloaded");

        Ok(body)
    }

    fn close(&self) {
        let client = self
            .client
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        if client.is_some() {
            tracing::debug!("HTTP client closed");
        }
    }
}
