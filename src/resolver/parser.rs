//! IMDb search results parser
//!
//! The id is taken from the first result link, e.g.
//! `/title/tt17009710/?ref_=fn_all_ttl_1` → `tt17009710`.

use crate::domain::TitleId;
use crate::resolver::ResolveError;
use scraper::{Html, Selector};

/// Link of a search result item
const RESULT_LINK: &str = "a.ipc-metadata-list-summary-item__t";

/// Path prefix of title links
const TITLE_PATH_PREFIX: &str = "/title/";

/// Extracts the IMDb id of the first search result
///
/// # Returns
///
/// * `Ok(TitleId)` - Id of the first result
/// * `Err(ResolveError)` - No result, no link, or a link that is not a title
pub fn extract_title_id(html: &str) -> Result<TitleId, ResolveError> {
    let document = Html::parse_document(html);

    let result_link = Selector::parse(RESULT_LINK)
        .map_err(|e| ResolveError::Selector(format!("{:?}", e)))?;

    let item = document
        .select(&result_link)
        .next()
        .ok_or(ResolveError::NoItem)?;

    let href = item
        .value()
        .attr("href")
        .map(str::trim)
        .filter(|href| !href.is_empty())
        .ok_or(ResolveError::NoHref)?;

    title_id_from_href(href)
}

/// Takes the path segment after `/title/` from a result link
pub fn title_id_from_href(href: &str) -> Result<TitleId, ResolveError> {
    let rest = href
        .strip_prefix(TITLE_PATH_PREFIX)
        .ok_or_else(|| ResolveError::NotTitleLink(href.to_string()))?;

    let id = rest.split(['/', '?', '#']).next().unwrap_or_default();

    if id.is_empty() {
        return Err(ResolveError::NoId(href.to_string()));
    }

    Ok(TitleId::new(id))
}
