use crate::domain::TitleId;
use chrono::{DateTime, Utc};

/// A single movie vote read from the user's votes list
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Vote {
    /// Kinopoisk movie page reference, e.g. `/film/4985498/`
    pub movie_url: String,

    /// Localized (russian) movie title, without the year suffix
    pub movie_name_ru: String,

    /// Original-language title, if the page shows one
    pub movie_name_original: Option<String>,

    /// Release year as a 4-digit string
    pub movie_year: Option<String>,

    /// When the vote was given
    pub timestamp: DateTime<Utc>,

    /// Vote value, 1..=10; zero means "not parsed"
    pub rate: u8,

    /// Resolved IMDb identifier, empty until resolution
    pub imdb_id: TitleId,
}

impl Vote {
    /// Returns the title used for the IMDb search and the CSV `Title` column
    ///
    /// The original title is preferred over the localized one; the year is
    /// appended as ` (YYYY)` when known.
    pub fn original_title(&self) -> String {
        let mut title = match &self.movie_name_original {
            Some(original) if !original.is_empty() => original.clone(),
            _ => self.movie_name_ru.clone(),
        };

        if let Some(year) = self.movie_year.as_deref().filter(|y| !y.is_empty()) {
            title.push_str(" (");
            title.push_str(year);
            title.push(')');
        }

        title
    }
}
