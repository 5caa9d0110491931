use crate::domain::Vote;
use std::collections::HashSet;
use thiserror::Error;

/// Highest accepted vote value
pub const MAX_RATE: u8 = 10;

/// Reasons a vote is refused by the collection
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("no movie URL in vote item {0}")]
    MissingMovieUrl(String),

    #[error("no movie rate in vote item {0}")]
    MissingRate(String),

    #[error("movie rate {rate} is out of range in vote item {title}")]
    RateOutOfRange { title: String, rate: u8 },

    #[error("no IMDb ID in vote item {0}")]
    MissingImdbId(String),

    #[error("invalid IMDb ID '{id}' in vote item {title}")]
    InvalidImdbId { title: String, id: String },
}

/// Ordered collection of validated votes, unique by movie URL
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Votes {
    items: Vec<Vote>,
    movie_urls: HashSet<String>,
}

impl Votes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates and appends a vote
    ///
    /// # Returns
    ///
    /// * `Ok(())` - The vote was appended
    /// * `Err(ValidationError)` - A required field is missing or malformed
    pub fn add(&mut self, vote: Vote) -> Result<(), ValidationError> {
        validate(&vote)?;

        self.movie_urls.insert(vote.movie_url.clone());
        self.items.push(vote);

        Ok(())
    }

    /// Appends a vote unless one with the same movie URL is already present
    ///
    /// Duplicates are dropped without validation.
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - The vote was appended
    /// * `Ok(false)` - The vote was a duplicate and was discarded
    /// * `Err(ValidationError)` - The vote is new but invalid
    pub fn add_once(&mut self, vote: Vote) -> Result<bool, ValidationError> {
        if self.contains(&vote.movie_url) {
            return Ok(false);
        }

        self.add(vote).map(|()| true)
    }

    pub fn contains(&self, movie_url: &str) -> bool {
        self.movie_urls.contains(movie_url)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Vote> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[Vote] {
        &self.items
    }

    pub fn into_vec(self) -> Vec<Vote> {
        self.items
    }
}

impl<'a> IntoIterator for &'a Votes {
    type Item = &'a Vote;
    type IntoIter = std::slice::Iter<'a, Vote>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

fn validate(vote: &Vote) -> Result<(), ValidationError> {
    let title = || vote.movie_name_ru.clone();

    if vote.movie_url.is_empty() {
        return Err(ValidationError::MissingMovieUrl(title()));
    }

    if vote.rate == 0 {
        return Err(ValidationError::MissingRate(title()));
    }

    if vote.rate > MAX_RATE {
        return Err(ValidationError::RateOutOfRange {
            title: title(),
            rate: vote.rate,
        });
    }

    if vote.imdb_id.is_empty() {
        return Err(ValidationError::MissingImdbId(title()));
    }

    if !vote.imdb_id.is_valid() {
        return Err(ValidationError::InvalidImdbId {
            title: title(),
            id: vote.imdb_id.to_string(),
        });
    }

    Ok(())
}
