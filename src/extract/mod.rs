//! Field extraction from rendered pages.
//!
//! Every entity is read through a [`StrategyChain`]: an ordered list of
//! extraction strategies where the first one that yields usable candidates
//! wins. Site markup changes then degrade to a fallback instead of silently
//! producing nothing.

mod drawer;
mod filter;
mod fixtures;
mod roster;
mod select;
mod team_search;

pub use drawer::find_drawer_link;
pub use filter::{is_followable_href, is_listing_url, is_self_link, MAX_TEAM_OPTIONS};
pub use fixtures::extract_matches;
pub use roster::extract_players;
pub use select::{attr_in, first_in, selector, text_in, text_of};
pub use team_search::extract_team_options;

use chrono::{DateTime, Utc};
use scraper::{ElementRef, Html};
use tracing::debug;
use url::Url;

use crate::models::{Match, Player};
use crate::normalize::collapse_whitespace;

/// Characters of page markup kept when reporting a page with no data.
pub const HTML_SAMPLE_CHARS: usize = 2000;

/// Inputs to extraction that do not come from the page.
#[derive(Debug, Clone, Copy)]
pub struct ExtractContext {
    /// Reference time for completion inference and record timestamps.
    pub now: DateTime<Utc>,
}

impl ExtractContext {
    pub fn at(now: DateTime<Utc>) -> Self {
        Self { now }
    }
}

/// A parsed page together with the URL it was loaded from.
pub struct Document {
    html: Html,
    url: String,
    base: Option<Url>,
}

impl Document {
    pub fn parse(html: &str, url: &str) -> Self {
        Self {
            html: Html::parse_document(html),
            url: url.to_string(),
            base: Url::parse(url).ok(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn select_all(&self, css: &str) -> Vec<ElementRef<'_>> {
        match selector(css) {
            Some(sel) => self.html.select(&sel).collect(),
            None => Vec::new(),
        }
    }

    pub fn select_first(&self, css: &str) -> Option<ElementRef<'_>> {
        let sel = selector(css)?;
        self.html.select(&sel).next()
    }

    /// Resolve an href against the page URL. Non-navigational hrefs give None.
    pub fn resolve(&self, href: &str) -> Option<String> {
        let href = href.trim();
        if !is_followable_href(href) {
            return None;
        }
        match &self.base {
            Some(base) => base.join(href).ok().map(|u| u.to_string()),
            None => Url::parse(href).ok().map(|u| u.to_string()),
        }
    }

    pub fn title(&self) -> String {
        self.select_first("title")
            .map(|t| collapse_whitespace(&text_of(t)))
            .unwrap_or_default()
    }

    /// Leading slice of the body markup, for diagnosing empty pages.
    pub fn html_sample(&self, max_chars: usize) -> String {
        let markup = match self.select_first("body") {
            Some(body) => body.inner_html(),
            None => self.html.root_element().html(),
        };
        markup.chars().take(max_chars).collect()
    }
}

/// One extraction strategy: candidates, or None when its markers are absent.
pub type Strategy<T> = fn(&Document) -> Option<Vec<T>>;

/// Result of running a chain: which strategy won and what it produced.
#[derive(Debug)]
pub struct Extraction<T> {
    pub strategy: Option<&'static str>,
    pub items: Vec<T>,
}

/// Ordered extraction strategies for a single entity type.
pub struct StrategyChain<T> {
    entity: &'static str,
    strategies: Vec<(&'static str, Strategy<T>)>,
}

impl<T> StrategyChain<T> {
    pub fn new(entity: &'static str) -> Self {
        Self {
            entity,
            strategies: Vec::new(),
        }
    }

    pub fn then(mut self, name: &'static str, strategy: Strategy<T>) -> Self {
        self.strategies.push((name, strategy));
        self
    }

    /// Run strategies in order. The first whose candidates survive `accept`
    /// wins; later strategies are not consulted.
    pub fn run<P>(&self, doc: &Document, accept: P) -> Extraction<T>
    where
        P: Fn(&T) -> bool,
    {
        for (name, strategy) in &self.strategies {
            let Some(candidates) = strategy(doc) else {
                debug!("{}: strategy '{}' found no markers", self.entity, name);
                continue;
            };
            let total = candidates.len();
            let items: Vec<T> = candidates.into_iter().filter(|c| accept(c)).collect();
            if items.is_empty() {
                debug!(
                    "{}: strategy '{}' yielded {} candidate(s), none usable",
                    self.entity, name, total
                );
                continue;
            }
            debug!(
                "{}: strategy '{}' kept {} of {} candidate(s)",
                self.entity,
                name,
                items.len(),
                total
            );
            return Extraction {
                strategy: Some(*name),
                items,
            };
        }
        Extraction {
            strategy: None,
            items: Vec::new(),
        }
    }
}

/// What a draw page turned out to contain.
#[derive(Debug)]
pub enum DrawContents {
    Matches(Vec<Match>),
    Roster(Vec<Player>),
    Empty,
}

/// Extract fixtures from a draw page, falling back to a roster.
pub fn extract_draw(doc: &Document, ctx: &ExtractContext) -> DrawContents {
    let matches = extract_matches(doc, ctx);
    if !matches.is_empty() {
        return DrawContents::Matches(matches);
    }
    let players = extract_players(doc);
    if !players.is_empty() {
        return DrawContents::Roster(players);
    }
    DrawContents::Empty
}
