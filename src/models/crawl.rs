//! Crawl job and stage models.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::dedup::url_identity;

/// A named phase of the crawl. Each stage has its own readiness signal and
/// extraction logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Stage {
    Search,
    TeamSelection,
    ScrapeDraw,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Search => "search",
            Self::TeamSelection => "team-selection",
            Self::ScrapeDraw => "scrape-draw",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "search" => Some(Self::Search),
            "team-selection" | "team_selection" | "team" => Some(Self::TeamSelection),
            "scrape-draw" | "scrape_draw" | "draw" => Some(Self::ScrapeDraw),
            _ => None,
        }
    }

    /// Selectors that signal the page has rendered enough to extract from,
    /// in order of preference.
    pub fn ready_selectors(&self) -> &'static [&'static str] {
        match self {
            Self::Search => &[
                ".l-grid__cell a[href*=\"/Competitions/Competition/\"]",
                "a[href*=\"/Competitions/Competition/\"]",
            ],
            Self::TeamSelection => &["nav a[href]", "a[href*=\"draw\"]", "a[href]"],
            Self::ScrapeDraw => &["ul.l-grid", ".match-team__name--home", "table tr"],
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Context carried from one stage to the next.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team_name: Option<String>,
    /// Raw selection index as supplied by the user; validated by the router.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_team_index: Option<serde_json::Value>,
    /// Name of the team option chosen during search.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_team: Option<String>,
}

/// A unit of work: one URL to load and the stage to run against it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrawlJob {
    pub url: String,
    pub stage: Stage,
    #[serde(default)]
    pub payload: JobPayload,
    /// Key used by the queue to drop repeat submissions.
    pub unique_key: String,
}

impl CrawlJob {
    pub fn search(url: impl Into<String>, payload: JobPayload) -> Self {
        let url = url.into();
        let unique_key = match payload.team_name.as_deref() {
            Some(name) if !name.trim().is_empty() => format!("search-{}", name.trim()),
            _ => format!("search-{}", url_identity(&url)),
        };
        Self {
            url,
            stage: Stage::Search,
            payload,
            unique_key,
        }
    }

    pub fn team_selection(url: impl Into<String>, payload: JobPayload) -> Self {
        let url = url.into();
        Self {
            unique_key: format!("team-{}", url_identity(&url)),
            url,
            stage: Stage::TeamSelection,
            payload,
        }
    }

    pub fn scrape_draw(url: impl Into<String>, payload: JobPayload) -> Self {
        let url = url.into();
        Self {
            unique_key: format!("draw-{}", url_identity(&url)),
            url,
            stage: Stage::ScrapeDraw,
            payload,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_round_trips_through_str() {
        for stage in [Stage::Search, Stage::TeamSelection, Stage::ScrapeDraw] {
            assert_eq!(Stage::from_str(stage.as_str()), Some(stage));
        }
        assert_eq!(Stage::from_str("bogus"), None);
    }

    #[test]
    fn test_stage_serializes_as_kebab_case() {
        let json = serde_json::to_string(&Stage::TeamSelection).unwrap();
        assert_eq!(json, "\"team-selection\"");
    }

    #[test]
    fn test_search_key_uses_team_name() {
        let payload = JobPayload {
            team_name: Some("Wolves".to_string()),
            ..Default::default()
        };
        let job = CrawlJob::search("https://example.com/search?q=wolves", payload);
        assert_eq!(job.unique_key, "search-Wolves");
    }

    #[test]
    fn test_draw_keys_ignore_trailing_slash_and_fragment() {
        let a = CrawlJob::scrape_draw("https://Example.com/draw/", JobPayload::default());
        let b = CrawlJob::scrape_draw("https://example.com/draw#top", JobPayload::default());
        assert_eq!(a.unique_key, b.unique_key);
    }
}
