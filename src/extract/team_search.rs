//! Team options from a search results page.

use scraper::ElementRef;
use tracing::debug;

use super::filter::{is_listing_url, MAX_TEAM_OPTIONS};
use super::select::{first_in, text_in, text_of};
use super::{Document, StrategyChain};
use crate::dedup::dedup_by_identity;
use crate::models::TeamOption;
use crate::normalize::{collapse_whitespace, first_line};

const RESULT_CARD_LINKS: &str = ".l-grid__cell a[href*=\"/Competitions/Competition/\"]";
const COMPETITION_LINKS: &str =
    "a[href*=\"/competitions/competition/\" i], a[href*=\"/team/\" i]";
const RESULT_CONTAINER_LINKS: &str =
    ".search-results a[href], .search-result a[href], [class*=\"result\"] a[href]";

const CARD_NAME: &str = "dl.u-spacing-mb-xx-small";
const CARD_COMPETITION: &str = ".club-card-content__club";
const CARD_LOZENGE: &str = ".o-lozenge";

/// Path fragment identifying a page that is itself a team or competition.
const ENTITY_PATH_MARKERS: &[&str] = &["/competitions/competition/", "/team/"];

fn chain() -> StrategyChain<TeamOption> {
    StrategyChain::new("team option")
        .then("result-cards", from_result_cards)
        .then("competition-links", from_competition_links)
        .then("result-containers", from_result_containers)
        .then("page-itself", from_page_itself)
}

/// Extract up to [`MAX_TEAM_OPTIONS`] distinct team options, in page order.
pub fn extract_team_options(doc: &Document) -> Vec<TeamOption> {
    let hit = chain().run(doc, |candidate| {
        !candidate.name.is_empty() && !is_listing_url(&candidate.url)
    });

    let mut options = dedup_by_identity(hit.items);
    options.truncate(MAX_TEAM_OPTIONS);

    for option in options.iter().filter(|o| !o.is_team_result()) {
        debug!(
            "Keeping non-team result '{}' ({})",
            option.name, option.result_type
        );
    }
    options
}

fn from_result_cards(doc: &Document) -> Option<Vec<TeamOption>> {
    links_as_options(doc, RESULT_CARD_LINKS)
}

fn from_competition_links(doc: &Document) -> Option<Vec<TeamOption>> {
    links_as_options(doc, COMPETITION_LINKS)
}

fn from_result_containers(doc: &Document) -> Option<Vec<TeamOption>> {
    links_as_options(doc, RESULT_CONTAINER_LINKS)
}

/// A search that lands directly on the team returns that page as the only option.
fn from_page_itself(doc: &Document) -> Option<Vec<TeamOption>> {
    let path = url::Url::parse(doc.url()).ok()?.path().to_ascii_lowercase();
    if !ENTITY_PATH_MARKERS.iter().any(|m| path.contains(m)) {
        return None;
    }
    let heading = doc
        .select_first("h1")
        .map(|h| collapse_whitespace(&text_of(h)))
        .filter(|h| !h.is_empty());
    let name = heading.unwrap_or_else(|| doc.title());
    Some(vec![TeamOption {
        name,
        url: doc.url().to_string(),
        competition: String::new(),
        result_type: String::new(),
    }])
}

fn links_as_options(doc: &Document, css: &str) -> Option<Vec<TeamOption>> {
    let links = doc.select_all(css);
    if links.is_empty() {
        return None;
    }
    Some(
        links
            .into_iter()
            .filter_map(|link| read_option(doc, link))
            .collect(),
    )
}

fn read_option(doc: &Document, link: ElementRef<'_>) -> Option<TeamOption> {
    let url = doc.resolve(link.value().attr("href")?)?;
    Some(TeamOption {
        name: card_name(link),
        url,
        competition: text_in(link, CARD_COMPETITION),
        result_type: text_in(link, CARD_LOZENGE),
    })
}

/// Team name: the card's name block, else the card text following the
/// result-type label, else the whole link text.
fn card_name(link: ElementRef<'_>) -> String {
    let named = text_in(link, CARD_NAME);
    if !named.is_empty() {
        return named;
    }
    let all = text_of(link);
    if let Some(lozenge) = first_in(link, CARD_LOZENGE) {
        let label = text_of(lozenge);
        let rest = if label.trim().is_empty() {
            all.clone()
        } else {
            all.replacen(&label, "", 1)
        };
        let after = first_line(&rest);
        if !after.is_empty() {
            return after;
        }
    }
    collapse_whitespace(&all)
}
