//! Match fixtures from a draw page.

use scraper::ElementRef;

use super::select::{attr_in, first_in, text_in, text_of};
use super::{Document, ExtractContext, StrategyChain};
use crate::dedup::dedup_by_identity;
use crate::models::Match;
use crate::normalize::{
    collapse_whitespace, first_line, format_kickoff, infer_completion, parse_kickoff, parse_score,
    CompletionInput,
};

const MATCH_ITEMS: &str = "ul.l-grid > li";
const LOOSE_MATCH_ITEMS: &str =
    "[class*=\"match-card\"], article[class*=\"match\"], li[class*=\"match\"], div.match, .fixture";

const TITLE: &str = ".match-header__title";
const ROUND: &str = ".match-header__title span";
const KICKOFF: &str = "time";
const HOME_NAME: &str = ".match-team__name--home, [class*=\"team__name--home\"], .home-team";
const AWAY_NAME: &str = ".match-team__name--away, [class*=\"team__name--away\"], .away-team";
const VENUE: &str = ".match-cta__link, .venue";
const MATCH_LINK: &str = "a[href*=\"/Competitions/Match/\" i], a[href*=\"/match/\" i]";
const STATUS: &str = ".match__lozenge, .match-status";
const HOME_SCORE: &str = ".match-team__score--home, [class*=\"score--home\"], .home-score";
const AWAY_SCORE: &str = ".match-team__score--away, [class*=\"score--away\"], .away-score";

/// Fields as read from the page, before normalization.
#[derive(Debug, Default)]
struct RawMatch {
    date: String,
    round: String,
    kick_off_time: String,
    date_time: String,
    home_team: String,
    away_team: String,
    venue: String,
    match_url: String,
    match_url_relative: String,
    status: String,
    home_score: Option<String>,
    away_score: Option<String>,
}

fn chain() -> StrategyChain<RawMatch> {
    StrategyChain::new("match")
        .then("grid-items", from_grid_items)
        .then("match-cards", from_match_cards)
}

/// Extract and normalize every distinct fixture on the page.
pub fn extract_matches(doc: &Document, ctx: &ExtractContext) -> Vec<Match> {
    let hit = chain().run(doc, |raw| {
        !raw.home_team.is_empty() && !raw.away_team.is_empty()
    });
    let matches = hit
        .items
        .into_iter()
        .map(|raw| normalize(raw, doc.url(), ctx))
        .collect();
    dedup_by_identity(matches)
}

fn from_grid_items(doc: &Document) -> Option<Vec<RawMatch>> {
    read_items(doc, MATCH_ITEMS)
}

fn from_match_cards(doc: &Document) -> Option<Vec<RawMatch>> {
    read_items(doc, LOOSE_MATCH_ITEMS)
}

fn read_items(doc: &Document, css: &str) -> Option<Vec<RawMatch>> {
    let items = doc.select_all(css);
    if items.is_empty() {
        return None;
    }
    Some(items.into_iter().map(|item| read_match(doc, item)).collect())
}

fn read_match(doc: &Document, item: ElementRef<'_>) -> RawMatch {
    let link = first_in(item, MATCH_LINK).and_then(|a| a.value().attr("href"));
    let match_url_relative = link.map(|href| href.trim().to_string()).unwrap_or_default();
    let match_url = link.and_then(|href| doc.resolve(href)).unwrap_or_default();

    RawMatch {
        date: first_in(item, TITLE)
            .map(|title| first_line(&text_of(title)))
            .unwrap_or_default(),
        round: text_in(item, ROUND),
        kick_off_time: text_in(item, KICKOFF),
        date_time: attr_in(item, KICKOFF, "datetime").unwrap_or_default(),
        home_team: text_in(item, HOME_NAME),
        away_team: text_in(item, AWAY_NAME),
        venue: text_in(item, VENUE),
        match_url,
        match_url_relative,
        status: first_in(item, STATUS).map(text_of).unwrap_or_default(),
        home_score: first_in(item, HOME_SCORE).map(|s| collapse_whitespace(&text_of(s))),
        away_score: first_in(item, AWAY_SCORE).map(|s| collapse_whitespace(&text_of(s))),
    }
}

fn normalize(raw: RawMatch, source_url: &str, ctx: &ExtractContext) -> Match {
    let kickoff = parse_kickoff(&raw.date_time);
    let completion = infer_completion(
        CompletionInput {
            status: &raw.status,
            kickoff,
            home_score: raw.home_score.as_deref().and_then(parse_score),
            away_score: raw.away_score.as_deref().and_then(parse_score),
        },
        ctx.now,
    );

    Match {
        date: raw.date,
        round: raw.round,
        kick_off_time: raw.kick_off_time,
        date_time_iso: kickoff
            .map(|k| format_kickoff(&k))
            .unwrap_or(raw.date_time),
        home_team: raw.home_team,
        away_team: raw.away_team,
        venue: raw.venue,
        match_url: raw.match_url,
        match_url_relative: raw.match_url_relative,
        game_status: completion.game_status,
        is_completed: completion.is_completed,
        home_score: completion.home_score,
        away_score: completion.away_score,
        source_url: source_url.to_string(),
        scraped_at: ctx.now,
    }
}
