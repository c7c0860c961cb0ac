//! Match fixtures and roster entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Placeholder for roster fields that could not be read.
pub const UNKNOWN: &str = "Unknown";

/// A single fixture from a draw page, normalized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Match {
    pub date: String,
    pub round: String,
    pub kick_off_time: String,
    #[serde(rename = "dateTimeISO")]
    pub date_time_iso: String,
    pub home_team: String,
    pub away_team: String,
    pub venue: String,
    pub match_url: String,
    /// The href exactly as it appeared in the page.
    pub match_url_relative: String,
    pub game_status: String,
    pub is_completed: bool,
    pub home_score: Option<u32>,
    pub away_score: Option<u32>,
    pub source_url: String,
    pub scraped_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub name: String,
    pub position: String,
    pub jersey_number: String,
}

impl Player {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            position: UNKNOWN.to_string(),
            jersey_number: UNKNOWN.to_string(),
        }
    }
}

/// A player emitted from a specific roster page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterEntry {
    #[serde(flatten)]
    pub player: Player,
    pub source_url: String,
    pub scraped_at: DateTime<Utc>,
}
