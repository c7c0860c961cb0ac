//! Candidate filtering shared by all extractors.

use url::Url;

use crate::dedup::url_identity;

/// Maximum number of team options returned from a single search.
pub const MAX_TEAM_OPTIONS: usize = 20;

const NON_NAVIGATIONAL_PREFIXES: &[&str] = &["#", "javascript:", "mailto:", "tel:"];

/// Paths of listing and utility pages that are never an entity themselves.
const LISTING_PATHS: &[&str] = &[
    "",
    "/competitions",
    "/competitions/competition",
    "/competitions/match",
    "/login",
    "/register",
];

/// Whether an href points somewhere worth following.
pub fn is_followable_href(href: &str) -> bool {
    let href = href.trim().to_ascii_lowercase();
    !href.is_empty()
        && !NON_NAVIGATIONAL_PREFIXES
            .iter()
            .any(|prefix| href.starts_with(prefix))
}

/// Whether an absolute URL is a site root, search page or bare listing.
pub fn is_listing_url(url: &str) -> bool {
    let Ok(parsed) = Url::parse(url) else {
        return true;
    };
    if !matches!(parsed.scheme(), "http" | "https") {
        return true;
    }
    let path = parsed.path().trim_end_matches('/').to_ascii_lowercase();
    LISTING_PATHS.contains(&path.as_str()) || path.starts_with("/search")
}

/// Whether `url` points back at the page it was found on.
pub fn is_self_link(url: &str, page_url: &str) -> bool {
    url_identity(url) == url_identity(page_url)
}

/// Names that identify table header rows rather than people.
pub fn is_header_label(name: &str) -> bool {
    name.eq_ignore_ascii_case("name") || name.eq_ignore_ascii_case("player")
}
