//! First-wins de-duplication by stable identity.

use std::collections::HashSet;

use url::Url;

use crate::models::{Match, Player, TeamOption};
use crate::normalize::collapse_whitespace;

/// Normalize a URL into an identity key.
///
/// Scheme and fragment are ignored, host and path are lowercased, and a
/// trailing slash is dropped. The query string is kept.
pub fn url_identity(url: &str) -> String {
    let trimmed = url.trim();
    match Url::parse(trimmed) {
        Ok(parsed) => {
            let mut key = parsed.host_str().unwrap_or_default().to_ascii_lowercase();
            if let Some(port) = parsed.port() {
                key.push(':');
                key.push_str(&port.to_string());
            }
            key.push_str(parsed.path().trim_end_matches('/').to_lowercase().as_str());
            if let Some(query) = parsed.query().filter(|q| !q.is_empty()) {
                key.push('?');
                key.push_str(query);
            }
            key
        }
        Err(_) => {
            let without_fragment = trimmed.split('#').next().unwrap_or_default();
            let without_scheme = without_fragment
                .split_once("://")
                .map_or(without_fragment, |(_, rest)| rest);
            without_scheme.trim_end_matches('/').to_lowercase()
        }
    }
}

/// Something with a stable identity for de-duplication.
pub trait Identity {
    fn identity_key(&self) -> String;
}

impl Identity for TeamOption {
    fn identity_key(&self) -> String {
        url_identity(&self.url)
    }
}

impl Identity for Match {
    fn identity_key(&self) -> String {
        if !self.match_url.is_empty() {
            return url_identity(&self.match_url);
        }
        format!(
            "{}|{}|{}",
            self.home_team.to_lowercase(),
            self.away_team.to_lowercase(),
            self.date_time_iso
        )
    }
}

impl Identity for Player {
    fn identity_key(&self) -> String {
        collapse_whitespace(&self.name).to_lowercase()
    }
}

/// Tracks identities already admitted.
#[derive(Debug, Default)]
pub struct Deduplicator {
    seen: HashSet<String>,
}

impl Deduplicator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true the first time a key is seen.
    pub fn admit(&mut self, key: String) -> bool {
        self.seen.insert(key)
    }
}

/// Drop repeats, keeping the first occurrence in input order.
pub fn dedup_by_identity<T: Identity>(items: Vec<T>) -> Vec<T> {
    let mut seen = Deduplicator::new();
    items
        .into_iter()
        .filter(|item| seen.admit(item.identity_key()))
        .collect()
}
