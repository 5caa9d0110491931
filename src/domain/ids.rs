//! Identifiers used across the export: Kinopoisk users and IMDb titles.
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;
use thiserror::Error;

/// Base URL of IMDb title pages
pub const IMDB_TITLE_URL: &str = "https://www.imdb.com/title/";

fn title_id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^tt[0-9]+$").expect("title id pattern is valid"))
}

/// Numeric Kinopoisk user identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UserId(u64);

impl UserId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn value(&self) -> u64 {
        self.0
    }

    /// Returns the user's profile URL on the given Kinopoisk host
    ///
    /// # Example
    ///
    /// ```
    /// use kpvotes::domain::UserId;
    ///
    /// let uid = UserId::new(33666291);
    /// assert_eq!(
    ///     uid.profile_url("https://www.kinopoisk.ru"),
    ///     "https://www.kinopoisk.ru/user/33666291"
    /// );
    /// ```
    pub fn profile_url(&self, host: &str) -> String {
        format!("{}/user/{}", host.trim_end_matches('/'), self.0)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Error returned when a user id cannot be parsed
#[derive(Debug, Error)]
#[error("failed to convert '{value}' into user ID: {source}")]
pub struct InvalidUserId {
    value: String,
    source: std::num::ParseIntError,
}

impl FromStr for UserId {
    type Err = InvalidUserId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u64>()
            .map(Self)
            .map_err(|source| InvalidUserId {
                value: s.to_string(),
                source,
            })
    }
}

/// IMDb title identifier, e.g. `tt17009710`
///
/// An empty id means "not resolved yet".
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TitleId(String);

impl TitleId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns true if the id has the `tt<digits>` form
    pub fn is_valid(&self) -> bool {
        title_id_pattern().is_match(&self.0)
    }

    /// Returns the IMDb title page URL
    pub fn to_url(&self) -> String {
        format!("{}{}", IMDB_TITLE_URL, self.0)
    }
}

impl fmt::Display for TitleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TitleId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}
