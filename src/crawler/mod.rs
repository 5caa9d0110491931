//! Crawler module for reading a user's votes
//!
//! This module contains the core crawling logic, including:
//! - Page fetching over HTTP or from local fixtures
//! - Votes page parsing
//! - Pagination and per-vote resolution

mod coordinator;
mod fetcher;
mod fixture;
mod parser;

pub use coordinator::{votes_page_url, PageError, VoteCrawler, VOTES_PER_PAGE};
pub use fetcher::{build_http_client, FetchError, Fetcher, HttpFetcher};
pub use fixture::FixtureFetcher;
pub use parser::{
    normalize_text, parse_vote_date, parse_votes_page, split_title_year, PageOutcome, ParseError,
    NOTHING_FOUND_MARKER, VOTE_DATE_FORMAT,
};
