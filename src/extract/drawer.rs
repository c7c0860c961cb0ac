//! The draw / squad / roster link on a team page.

use super::filter::{is_listing_url, is_self_link};
use super::select::text_of;
use super::{Document, StrategyChain};
use crate::models::DrawerLink;
use crate::normalize::collapse_whitespace;

const DRAWER_KEYWORDS: &[&str] = &["draw", "squad", "roster"];

const NAV_LINKS: &str = "nav a[href], [role=\"tablist\"] a[href], [class*=\"tabs\"] a[href], [class*=\"subnav\"] a[href]";
const ANY_LINK: &str = "a[href]";

fn chain() -> StrategyChain<DrawerLink> {
    StrategyChain::new("drawer link")
        .then("navigation", from_navigation)
        .then("any-link", from_any_link)
}

/// Find the link leading to the team's draw. When none exists the result has
/// `found == false` and points at the page itself.
pub fn find_drawer_link(doc: &Document) -> DrawerLink {
    chain()
        .run(doc, |link| {
            !is_self_link(&link.url, doc.url()) && !is_listing_url(&link.url)
        })
        .items
        .into_iter()
        .next()
        .unwrap_or_else(|| DrawerLink::not_found(doc.url()))
}

fn from_navigation(doc: &Document) -> Option<Vec<DrawerLink>> {
    keyword_links(doc, NAV_LINKS)
}

fn from_any_link(doc: &Document) -> Option<Vec<DrawerLink>> {
    keyword_links(doc, ANY_LINK)
}

fn keyword_links(doc: &Document, css: &str) -> Option<Vec<DrawerLink>> {
    let links = doc.select_all(css);
    if links.is_empty() {
        return None;
    }
    Some(
        links
            .into_iter()
            .filter_map(|link| {
                let href = link.value().attr("href")?;
                let text = collapse_whitespace(&text_of(link));
                if !mentions_drawer(href, &text) {
                    return None;
                }
                Some(DrawerLink {
                    found: true,
                    url: doc.resolve(href)?,
                    link_text: text,
                })
            })
            .collect(),
    )
}

fn mentions_drawer(href: &str, text: &str) -> bool {
    let href = href.to_lowercase();
    let text = text.to_lowercase();
    DRAWER_KEYWORDS
        .iter()
        .any(|k| href.contains(k) || text.contains(k))
}
