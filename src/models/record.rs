//! Records written to the output sink.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{Match, RosterEntry, Stage, TeamOption};

/// Machine-readable failure categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    ConfigurationError,
    NoResultsFound,
    NavigationTimeout,
    NoDataFound,
}

/// A structured failure that is emitted instead of silently producing nothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorRecord {
    pub kind: ErrorKind,
    pub message: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub context: Map<String, Value>,
    pub scraped_at: DateTime<Utc>,
}

impl ErrorRecord {
    pub fn new(
        kind: ErrorKind,
        message: impl Into<String>,
        url: impl Into<String>,
        scraped_at: DateTime<Utc>,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            url: url.into(),
            context: Map::new(),
            scraped_at,
        }
    }

    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.context.insert(key.to_string(), value.into());
        self
    }

    pub fn configuration(message: impl Into<String>, scraped_at: DateTime<Utc>) -> Self {
        Self::new(ErrorKind::ConfigurationError, message, "", scraped_at)
    }

    pub fn no_results(
        url: &str,
        team_name: Option<&str>,
        page_title: &str,
        html_sample: String,
        scraped_at: DateTime<Utc>,
    ) -> Self {
        Self::new(
            ErrorKind::NoResultsFound,
            "No search results found",
            url,
            scraped_at,
        )
        .with("teamName", team_name.unwrap_or_default())
        .with("pageTitle", page_title)
        .with("htmlSample", html_sample)
    }

    pub fn navigation_timeout(
        url: &str,
        stage: Stage,
        attempts: u32,
        cause: &str,
        scraped_at: DateTime<Utc>,
    ) -> Self {
        Self::new(
            ErrorKind::NavigationTimeout,
            format!("Page did not load after {} attempt(s): {}", attempts, cause),
            url,
            scraped_at,
        )
        .with("stage", stage.as_str())
        .with("attempts", attempts)
    }

    pub fn no_data(url: &str, html_sample: String, scraped_at: DateTime<Utc>) -> Self {
        Self::new(
            ErrorKind::NoDataFound,
            "No match data found",
            url,
            scraped_at,
        )
        .with("htmlSample", html_sample)
    }
}

/// Everything the crawler can emit, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum OutputRecord {
    TeamOption(TeamOption),
    Match(Match),
    Player(RosterEntry),
    Error(ErrorRecord),
}

impl OutputRecord {
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::TeamOption(_) => "team-option",
            Self::Match(_) => "match",
            Self::Player(_) => "player",
            Self::Error(_) => "error",
        }
    }

    pub fn as_error(&self) -> Option<&ErrorRecord> {
        match self {
            Self::Error(e) => Some(e),
            _ => None,
        }
    }
}
