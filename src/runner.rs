//! Export run orchestration
//!
//! A run goes through these steps:
//! 1. Import the IMDb lookup cache, if a cache file is configured
//! 2. Read the user's votes, resolving each title
//! 3. Write the votes as IMDb CSV
//! 4. Export the lookup cache, whatever the outcome of steps 2-3
//! 5. Close the fetcher

use crate::config::Config;
use crate::crawler::{Fetcher, HttpFetcher, VoteCrawler};
use crate::domain::UserId;
use crate::output::{ImdbCsvWriter, VotesWriter};
use crate::resolver::{ImdbResolver, MemoryCache, TitleCache};
use crate::{ConfigError, Result};
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Outcome of a successful export run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Number of exported votes
    pub votes: usize,

    /// Written CSV files, in chunk order
    pub files: Vec<PathBuf>,
}

/// Runs a complete export over HTTP
///
/// # Arguments
///
/// * `config` - Validated configuration
/// * `user` - Kinopoisk user whose votes are exported
/// * `cancel` - Cancellation token, e.g. tied to Ctrl-C
///
/// # Returns
///
/// * `Ok(RunSummary)` - Votes were written
/// * `Err(KpError)` - The run failed or was cancelled
pub async fn run(config: &Config, user: UserId, cancel: &CancellationToken) -> Result<RunSummary> {
    let fetcher = Arc::new(HttpFetcher::new(&config.http)?);

    let result = run_with_fetcher(config, user, fetcher.clone(), cancel).await;

    fetcher.close();

    result
}

/// Runs a complete export with the given fetcher
///
/// The fetcher is used for both the votes pages and the IMDb search and is
/// left open for the caller to close.
pub async fn run_with_fetcher(
    config: &Config,
    user: UserId,
    fetcher: Arc<dyn Fetcher>,
    cancel: &CancellationToken,
) -> Result<RunSummary> {
    let find_url = Url::parse(&config.imdb.find_url).map_err(|e| {
        ConfigError::InvalidUrl(format!("imdb.find-url '{}': {}", config.imdb.find_url, e))
    })?;

    let cache = Arc::new(MemoryCache::new());

    if let Some(cache_path) = &config.output.cache_path {
        let imported = cache.import_titles_ids(cache_path, cancel)?;
        tracing::info!(cache_path = %cache_path.display(), imported, "IMDb cache loaded");
    }

    let result = export_votes(config, user, fetcher, cache.clone(), find_url, cancel).await;

    if let Some(cache_path) = &config.output.cache_path {
        // The run token may already be cancelled; the cache is saved regardless
        match cache.export_titles_ids(cache_path, false, &CancellationToken::new()) {
            Ok(exported) => {
                tracing::info!(cache_path = %cache_path.display(), exported, "IMDb cache saved")
            }
            Err(e) => tracing::error!(cache_path = %cache_path.display(), "Failed to save IMDb cache: {}", e),
        }
    }

    result
}

async fn export_votes(
    config: &Config,
    user: UserId,
    fetcher: Arc<dyn Fetcher>,
    cache: Arc<MemoryCache>,
    find_url: Url,
    cancel: &CancellationToken,
) -> Result<RunSummary> {
    let resolver = Arc::new(ImdbResolver::new(fetcher.clone(), cache, find_url));
    let crawler = VoteCrawler::new(fetcher, resolver, config.kinopoisk.host.as_str());

    let votes = crawler.read_votes(user, cancel).await?;

    let files = ImdbCsvWriter::new()
        .write_to_file(
            &votes,
            &config.output.target_path,
            config.output.chunk_size,
            cancel,
        )
        .await?;

    tracing::info!(votes = votes.len(), files = files.len(), "Votes exported");

    Ok(RunSummary {
        votes: votes.len(),
        files,
    })
}
