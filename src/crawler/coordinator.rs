//! Vote crawler - pagination over a user's votes list
//!
//! This module drives the votes crawl, including:
//! - Building page URLs for a user
//! - Fetching and parsing pages in order until the list runs out
//! - Resolving each vote to an IMDb id
//! - Accumulating a deduplicated, validated collection

use crate::crawler::fetcher::{FetchError, Fetcher};
use crate::crawler::parser::{parse_votes_page, PageOutcome, ParseError};
use crate::domain::{UserId, Vote, Votes};
use crate::resolver::{ResolveError, TitleResolver};
use crate::KpError;
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Number of votes requested per list page
pub const VOTES_PER_PAGE: u32 = 200;

/// Errors that can occur while reading a single votes page
#[derive(Debug, Error)]
pub enum PageError {
    #[error(transparent)]
    Fetch(FetchError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("page processing cancelled")]
    Cancelled,
}

impl From<FetchError> for PageError {
    fn from(e: FetchError) -> Self {
        match e {
            FetchError::Cancelled => Self::Cancelled,
            other => Self::Fetch(other),
        }
    }
}

/// Builds the URL of a votes list page
///
/// # Arguments
///
/// * `host` - Site root, e.g. `https://www.kinopoisk.ru`
/// * `user` - Owner of the votes
/// * `page` - Page number, starting at 1
///
/// # Example
///
/// ```
/// use kpvotes::crawler::votes_page_url;
/// use kpvotes::domain::UserId;
///
/// assert_eq!(
///     votes_page_url("https://www.kinopoisk.ru", UserId::new(42), 3),
///     "https://www.kinopoisk.ru/user/42/votes/list/vs/vote/perpage/200/page/3"
/// );
/// ```
pub fn votes_page_url(host: &str, user: UserId, page: u32) -> String {
    format!(
        "{}/votes/list/vs/vote/perpage/{}/page/{}",
        user.profile_url(host),
        VOTES_PER_PAGE,
        page
    )
}

/// Crawler over a user's votes list
pub struct VoteCrawler {
    fetcher: Arc<dyn Fetcher>,
    resolver: Arc<dyn TitleResolver>,
    host: String,
}

impl VoteCrawler {
    /// Creates a crawler
    ///
    /// # Arguments
    ///
    /// * `fetcher` - Fetcher used for votes pages
    /// * `resolver` - Resolver for IMDb ids
    /// * `host` - Site root the user profile lives under
    pub fn new(
        fetcher: Arc<dyn Fetcher>,
        resolver: Arc<dyn TitleResolver>,
        host: impl Into<String>,
    ) -> Self {
        Self {
            fetcher,
            resolver,
            host: host.into(),
        }
    }

    /// Reads all votes of a user
    ///
    /// Pages are read one by one starting at 1. The crawl stops at the first
    /// page that is empty or carries the "nothing found" marker. Votes whose
    /// title cannot be resolved or that fail validation are skipped.
    ///
    /// # Returns
    ///
    /// * `Ok(Votes)` - Votes in page order
    /// * `Err(KpError::ReadPage)` - A page could not be fetched or parsed
    /// * `Err(KpError::Cancelled)` - The token was cancelled
    pub async fn read_votes(
        &self,
        user: UserId,
        cancel: &CancellationToken,
    ) -> Result<Votes, KpError> {
        tracing::info!(%user, "Reading votes");

        let mut votes = Votes::new();

        for page in 1.. {
            let parsed = match self.read_page(user, page, &mut votes, cancel).await {
                Ok(parsed) => parsed,
                Err(PageError::Cancelled) => return Err(KpError::Cancelled),
                Err(source) => {
                    return Err(KpError::ReadPage { page, user, source });
                }
            };

            if parsed == 0 {
                tracing::debug!(page, "No more votes");
                break;
            }
        }

        tracing::info!(%user, votes = votes.len(), "Finished reading votes");

        Ok(votes)
    }

    /// Reads one page into `votes`, returning the number of parsed items
    async fn read_page(
        &self,
        user: UserId,
        page: u32,
        votes: &mut Votes,
        cancel: &CancellationToken,
    ) -> Result<usize, PageError> {
        if cancel.is_cancelled() {
            return Err(PageError::Cancelled);
        }

        let url = votes_page_url(&self.host, user, page);
        tracing::debug!(page, %url, "Fetching votes page");

        let body = self.fetcher.fetch(&url, cancel).await?;

        if cancel.is_cancelled() {
            return Err(PageError::Cancelled);
        }

        let items = match parse_votes_page(&body, page)? {
            PageOutcome::NothingFound => return Ok(0),
            PageOutcome::Items(items) => items,
        };

        let total = items.len();

        for (i, vote) in items.into_iter().enumerate() {
            if cancel.is_cancelled() {
                return Err(PageError::Cancelled);
            }

            if self.accept_vote(vote, votes, cancel).await? {
                tracing::info!("[read][page#{}][{:03}/{:03}] done", page, i + 1, total);
            }
        }

        Ok(total)
    }

    /// Resolves a vote and adds it to the collection
    ///
    /// Returns false when the vote was skipped for a failed lookup or
    /// validation; a duplicate counts as handled.
    async fn accept_vote(
        &self,
        mut vote: Vote,
        votes: &mut Votes,
        cancel: &CancellationToken,
    ) -> Result<bool, PageError> {
        let title = vote.original_title();

        vote.imdb_id = match self.resolver.get_id_by_title(&title, cancel).await {
            Ok(id) => id,
            Err(ResolveError::Cancelled) => return Err(PageError::Cancelled),
            Err(e) => {
                tracing::debug!(%title, "Failed to get IMDb ID: {}", e);
                return Ok(false);
            }
        };

        let movie_url = vote.movie_url.clone();
        match votes.add_once(vote) {
            Ok(true) => Ok(true),
            Ok(false) => {
                tracing::debug!(%movie_url, "Duplicate vote skipped");
                Ok(true)
            }
            Err(e) => {
                tracing::debug!(%title, "Vote rejected: {}", e);
                Ok(false)
            }
        }
    }
}
