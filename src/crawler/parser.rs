//! Votes page parser
//!
//! This module extracts votes from one page of a user's votes list:
//! - The "nothing found" marker that ends pagination
//! - One `Vote` per list item (title, year, original title, date, rate)
//!
//! Items without a title anchor are skipped; a malformed date or rate is
//! tolerated and left to the collection's validation.

use crate::domain::Vote;
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::sync::OnceLock;
use thiserror::Error;

/// Text shown in the filter form when the list has no more entries
pub const NOTHING_FOUND_MARKER: &str = "Ни одной записи не найдено";

/// Format of the vote date, e.g. `12.11.2023, 21:37`
pub const VOTE_DATE_FORMAT: &str = "%d.%m.%Y, %H:%M";

const FILTER_FORM: &str = "form#f_filtr";
const LIST_ITEMS: &str = "div.profileFilmsList > div.item";
const TITLE_ANCHOR: &str = "div.nameRus > a[href]";
const ORIGINAL_TITLE: &str = "div.nameEng";
const VOTE_DATE: &str = "div.date";
const VOTE_VALUE: &str = "div.vote";

/// Errors that abort parsing of a whole page
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("invalid selector '{selector}': {message}")]
    Selector {
        selector: &'static str,
        message: String,
    },
}

/// Result of parsing one votes page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageOutcome {
    /// Votes found on the page, in page order; may be empty
    Items(Vec<Vote>),

    /// The page states that no entries were found
    NothingFound,
}

struct ItemSelectors {
    title: Selector,
    original_title: Selector,
    date: Selector,
    vote: Selector,
}

impl ItemSelectors {
    fn new() -> Result<Self, ParseError> {
        Ok(Self {
            title: selector(TITLE_ANCHOR)?,
            original_title: selector(ORIGINAL_TITLE)?,
            date: selector(VOTE_DATE)?,
            vote: selector(VOTE_VALUE)?,
        })
    }
}

/// Parses a votes page
///
/// # Arguments
///
/// * `html` - The page body
/// * `page` - Page number, used for diagnostics only
///
/// # Returns
///
/// * `Ok(PageOutcome::NothingFound)` - The page carries the "nothing found" marker
/// * `Ok(PageOutcome::Items(votes))` - Votes parsed from the list, not yet resolved
/// * `Err(ParseError)` - The page could not be queried
///
/// # Example
///
/// ```
/// use kpvotes::crawler::{parse_votes_page, PageOutcome};
///
/// let html = r#"<div class="profileFilmsList">
///   <div class="item">
///     <div class="nameRus"><a href="/film/1/">Сталкер (1979)</a></div>
///     <div class="vote">10</div>
///   </div>
/// </div>"#;
///
/// match parse_votes_page(html, 1).unwrap() {
///     PageOutcome::Items(votes) => assert_eq!(votes[0].movie_year.as_deref(), Some("1979")),
///     PageOutcome::NothingFound => unreachable!(),
/// }
/// ```
pub fn parse_votes_page(html: &str, page: u32) -> Result<PageOutcome, ParseError> {
    let document = Html::parse_document(html);

    let filter_form = selector(FILTER_FORM)?;
    if let Some(form) = document.select(&filter_form).next() {
        if element_text(form).contains(NOTHING_FOUND_MARKER) {
            tracing::debug!(page, "Nothing found marker present");
            return Ok(PageOutcome::NothingFound);
        }
    }

    let list_items = selector(LIST_ITEMS)?;
    let item_selectors = ItemSelectors::new()?;

    let nodes: Vec<ElementRef<'_>> = document.select(&list_items).collect();
    let total = nodes.len();
    let mut votes = Vec::with_capacity(total);

    for (i, node) in nodes.into_iter().enumerate() {
        match parse_item(node, &item_selectors) {
            Some(vote) => votes.push(vote),
            None => tracing::warn!(page, item = i + 1, total, "No .nameRus title found, item skipped"),
        }
    }

    tracing::debug!(page, parsed = votes.len(), total, "Parsed votes page");

    Ok(PageOutcome::Items(votes))
}

fn parse_item(node: ElementRef<'_>, selectors: &ItemSelectors) -> Option<Vote> {
    let anchor = node.select(&selectors.title).next()?;

    let movie_url = anchor.value().attr("href").unwrap_or_default().trim().to_string();
    let (movie_name_ru, movie_year) = split_title_year(&normalize_text(&element_text(anchor)));

    let movie_name_original = node
        .select(&selectors.original_title)
        .next()
        .map(|n| normalize_text(&element_text(n)))
        .filter(|name| !name.is_empty());

    let timestamp = node
        .select(&selectors.date)
        .next()
        .map(|n| parse_vote_date(&normalize_text(&element_text(n))))
        .unwrap_or_else(Utc::now);

    let rate = node
        .select(&selectors.vote)
        .next()
        .and_then(|n| normalize_text(&element_text(n)).parse::<u8>().ok())
        .unwrap_or(0);

    Some(Vote {
        movie_url,
        movie_name_ru,
        movie_name_original,
        movie_year,
        timestamp,
        rate,
        ..Default::default()
    })
}

/// Splits a trailing ` (YYYY)` year off a title
///
/// # Example
///
/// ```
/// use kpvotes::crawler::split_title_year;
///
/// assert_eq!(
///     split_title_year("Anatomy of a Fall (2023)"),
///     ("Anatomy of a Fall".to_string(), Some("2023".to_string()))
/// );
/// assert_eq!(split_title_year("Solaris"), ("Solaris".to_string(), None));
/// ```
pub fn split_title_year(title: &str) -> (String, Option<String>) {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let pattern = PATTERN
        .get_or_init(|| Regex::new(r"^(?s)(.*) \(([0-9]{4})\)$").expect("year pattern is valid"));

    match pattern.captures(title) {
        Some(caps) => (caps[1].to_string(), Some(caps[2].to_string())),
        None => (title.to_string(), None),
    }
}

/// Parses a vote date, falling back to the current time
pub fn parse_vote_date(text: &str) -> DateTime<Utc> {
    match NaiveDateTime::parse_from_str(text, VOTE_DATE_FORMAT) {
        Ok(naive) => Utc.from_utc_datetime(&naive),
        Err(_) => Utc::now(),
    }
}

/// Replaces newlines with spaces and double quotes with single quotes, then trims
pub fn normalize_text(text: &str) -> String {
    text.replace(['\r', '\n'], " ")
        .replace('"', "'")
        .trim()
        .to_string()
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect()
}

fn selector(css: &'static str) -> Result<Selector, ParseError> {
    Selector::parse(css).map_err(|e| ParseError::Selector {
        selector: css,
        message: format!("{:?}", e),
    })
}
