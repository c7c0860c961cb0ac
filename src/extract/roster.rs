//! Roster players, used when a draw page lists people instead of fixtures.

use scraper::ElementRef;

use super::filter::is_header_label;
use super::select::text_in;
use super::{Document, StrategyChain};
use crate::dedup::dedup_by_identity;
use crate::models::{Player, UNKNOWN};

const PLAYER_ROWS: &str = "tr, .player-row, .player-item";
const ROW_NAME: &str = ".player-name, .name, td:first-child";

const PLAYER_CARDS: &str = ".player, [data-player], div[class*=\"player\"]";
const CARD_NAME: &str = ".name, .player-name, strong, b";

const POSITION: &str = ".position, .pos";
const JERSEY: &str = ".number, .jersey";

fn chain() -> StrategyChain<Player> {
    StrategyChain::new("player")
        .then("player-rows", from_rows)
        .then("player-cards", from_cards)
}

pub fn extract_players(doc: &Document) -> Vec<Player> {
    let hit = chain().run(doc, |p| !p.name.is_empty() && !is_header_label(&p.name));
    dedup_by_identity(hit.items)
}

fn from_rows(doc: &Document) -> Option<Vec<Player>> {
    read_players(doc, PLAYER_ROWS, ROW_NAME)
}

fn from_cards(doc: &Document) -> Option<Vec<Player>> {
    read_players(doc, PLAYER_CARDS, CARD_NAME)
}

fn read_players(doc: &Document, items: &str, name: &str) -> Option<Vec<Player>> {
    let elements = doc.select_all(items);
    if elements.is_empty() {
        return None;
    }
    Some(
        elements
            .into_iter()
            .map(|el| read_player(el, name))
            .collect(),
    )
}

fn read_player(el: ElementRef<'_>, name: &str) -> Player {
    Player {
        name: text_in(el, name),
        position: or_unknown(text_in(el, POSITION)),
        jersey_number: or_unknown(text_in(el, JERSEY)),
    }
}

fn or_unknown(value: String) -> String {
    if value.is_empty() {
        UNKNOWN.to_string()
    } else {
        value
    }
}
