//! Crawl input and run-mode resolution.
//!
//! Input is layered: defaults, then a config file, then environment
//! variables, then command-line flags.

mod browser;
mod loader;

pub use browser::BrowserSettings;
pub use loader::{load_from_path, load_input, LoadOptions};

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

use crate::error::ConfigError;
use crate::models::{CrawlJob, JobPayload};

pub const DEFAULT_MAX_REQUEST_RETRIES: u32 = 2;
pub const DEFAULT_REQUEST_TIMEOUT: u64 = 30;
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Placeholder in `startUrl` replaced by the encoded team name.
const QUERY_PLACEHOLDER: &str = "{query}";

/// Non-empty environment variable.
pub(crate) fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.trim().is_empty())
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    Discover,
    #[serde(alias = "scrape")]
    Scraper,
}

impl RunMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Discover => "discover",
            Self::Scraper => "scraper",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "discover" => Some(Self::Discover),
            "scraper" | "scrape" => Some(Self::Scraper),
            _ => None,
        }
    }
}

/// Everything a run can be configured with.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrawlInput {
    /// Search endpoint; the encoded team name is appended or substituted
    /// for `{query}`.
    #[serde(default)]
    pub start_url: Option<String>,

    #[serde(default)]
    pub team_name: Option<String>,

    /// Which search result to follow. Left raw; invalid values select 0.
    #[serde(default)]
    pub selected_team_index: Option<Value>,

    /// Draw page to scrape directly.
    #[serde(default)]
    pub drawer_url: Option<String>,

    /// "discover" or "scraper". Inferred from the other keys when absent.
    #[serde(default)]
    pub mode: Option<String>,

    #[serde(default)]
    pub stop_after_search: bool,

    /// Fetch attempts after the first before giving up on a page.
    #[serde(default)]
    pub max_request_retries: Option<u32>,

    /// JSON-lines output file; stdout when absent.
    #[serde(default)]
    pub output: Option<PathBuf>,

    #[serde(default)]
    pub user_agent: Option<String>,

    /// HTTP fetcher timeout in seconds.
    #[serde(default)]
    pub request_timeout: Option<u64>,

    #[serde(default)]
    pub browser: BrowserSettings,
}

/// Values supplied on the command line; each one set replaces the input.
#[derive(Debug, Clone, Default)]
pub struct InputOverrides {
    pub start_url: Option<String>,
    pub team_name: Option<String>,
    pub selected_team_index: Option<String>,
    pub drawer_url: Option<String>,
    pub mode: Option<String>,
    pub stop_after_search: bool,
    pub max_request_retries: Option<u32>,
    pub output: Option<PathBuf>,
    pub no_browser: bool,
    pub headful: bool,
}

/// A validated plan for one run.
#[derive(Debug, Clone, PartialEq)]
pub enum CrawlPlan {
    Discover {
        search_url: String,
        team_name: String,
        selected_team_index: Option<Value>,
    },
    Scrape {
        drawer_url: String,
    },
}

impl CrawlPlan {
    pub fn mode(&self) -> RunMode {
        match self {
            Self::Discover { .. } => RunMode::Discover,
            Self::Scrape { .. } => RunMode::Scraper,
        }
    }

    /// The job the run starts from.
    pub fn seed_job(&self) -> CrawlJob {
        match self {
            Self::Discover {
                search_url,
                team_name,
                selected_team_index,
            } => CrawlJob::search(
                search_url.clone(),
                JobPayload {
                    team_name: Some(team_name.clone()),
                    selected_team_index: selected_team_index.clone(),
                    selected_team: None,
                },
            ),
            Self::Scrape { drawer_url } => {
                CrawlJob::scrape_draw(drawer_url.clone(), JobPayload::default())
            }
        }
    }
}

impl CrawlInput {
    /// Apply `FIXTURECRAWL_*` and `BROWSER_URL` environment variables.
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(v) = env_var("FIXTURECRAWL_START_URL") {
            self.start_url = Some(v);
        }
        if let Some(v) = env_var("FIXTURECRAWL_TEAM_NAME") {
            self.team_name = Some(v);
        }
        if let Some(v) = env_var("FIXTURECRAWL_DRAWER_URL") {
            self.drawer_url = Some(v);
        }
        self.browser = self.browser.with_env_overrides();
        self
    }

    pub fn apply_overrides(&mut self, overrides: InputOverrides) {
        if overrides.start_url.is_some() {
            self.start_url = overrides.start_url;
        }
        if overrides.team_name.is_some() {
            self.team_name = overrides.team_name;
        }
        if let Some(index) = overrides.selected_team_index {
            // Numbers stay numbers so the input reads the same as a config file.
            self.selected_team_index = Some(match index.trim().parse::<i64>() {
                Ok(n) => Value::from(n),
                Err(_) => Value::String(index),
            });
        }
        if overrides.drawer_url.is_some() {
            self.drawer_url = overrides.drawer_url;
        }
        if overrides.mode.is_some() {
            self.mode = overrides.mode;
        }
        if overrides.stop_after_search {
            self.stop_after_search = true;
        }
        if overrides.max_request_retries.is_some() {
            self.max_request_retries = overrides.max_request_retries;
        }
        if overrides.output.is_some() {
            self.output = overrides.output;
        }
        if overrides.no_browser {
            self.browser.enabled = false;
        }
        if overrides.headful {
            self.browser.headless = false;
        }
    }

    pub fn max_request_retries(&self) -> u32 {
        self.max_request_retries
            .unwrap_or(DEFAULT_MAX_REQUEST_RETRIES)
    }

    pub fn user_agent(&self) -> &str {
        present(&self.user_agent).unwrap_or(DEFAULT_USER_AGENT)
    }

    pub fn request_timeout(&self) -> u64 {
        self.request_timeout.unwrap_or(DEFAULT_REQUEST_TIMEOUT)
    }

    /// Decide the run mode and check that its inputs are present.
    ///
    /// An explicit mode wins; otherwise `drawerUrl` means scraper mode and
    /// `startUrl` plus `teamName` means discover mode.
    pub fn resolve(&self) -> Result<CrawlPlan, ConfigError> {
        let mode = match present(&self.mode) {
            Some(raw) => {
                RunMode::from_str(raw).ok_or_else(|| ConfigError::UnknownMode(raw.to_string()))?
            }
            None if present(&self.drawer_url).is_some() => RunMode::Scraper,
            None if present(&self.start_url).is_some() && present(&self.team_name).is_some() => {
                RunMode::Discover
            }
            None => {
                return Err(ConfigError::MissingInput(
                    "drawerUrl, or startUrl and teamName",
                ))
            }
        };

        match mode {
            RunMode::Scraper => {
                let drawer_url =
                    present(&self.drawer_url).ok_or(ConfigError::MissingInput("drawerUrl"))?;
                Ok(CrawlPlan::Scrape {
                    drawer_url: validate_url("drawerUrl", drawer_url)?,
                })
            }
            RunMode::Discover => {
                let start_url =
                    present(&self.start_url).ok_or(ConfigError::MissingInput("startUrl"))?;
                let team_name =
                    present(&self.team_name).ok_or(ConfigError::MissingInput("teamName"))?;
                Ok(CrawlPlan::Discover {
                    search_url: build_search_url(start_url, team_name)?,
                    team_name: team_name.to_string(),
                    selected_team_index: self.selected_team_index.clone(),
                })
            }
        }
    }
}

/// Search URL for a team: lowercased, percent-encoded name appended to
/// `start_url` or substituted for `{query}`.
pub fn build_search_url(start_url: &str, team_name: &str) -> Result<String, ConfigError> {
    let query = urlencoding::encode(&team_name.trim().to_lowercase()).into_owned();
    let url = if start_url.contains(QUERY_PLACEHOLDER) {
        start_url.replace(QUERY_PLACEHOLDER, &query)
    } else {
        format!("{}{}", start_url, query)
    };
    validate_url("startUrl", &url)
}

fn validate_url(field: &'static str, value: &str) -> Result<String, ConfigError> {
    match Url::parse(value) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(value.to_string()),
        _ => Err(ConfigError::InvalidUrl {
            field,
            value: value.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Stage;
    use serde_json::json;

    fn input(json: Value) -> CrawlInput {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_drawer_url_implies_scraper() {
        let plan = input(json!({"drawerUrl": "https://example.com/draw"}))
            .resolve()
            .unwrap();
        assert_eq!(plan.mode(), RunMode::Scraper);
        let seed = plan.seed_job();
        assert_eq!(seed.stage, Stage::ScrapeDraw);
        assert_eq!(seed.url, "https://example.com/draw");
    }

    #[test]
    fn test_start_url_and_team_imply_discover() {
        let plan = input(json!({
            "startUrl": "https://example.com/search?q=",
            "teamName": "Northern Wolves",
            "selectedTeamIndex": "2"
        }))
        .resolve()
        .unwrap();
        assert_eq!(plan.mode(), RunMode::Discover);
        let seed = plan.seed_job();
        assert_eq!(seed.stage, Stage::Search);
        assert_eq!(seed.url, "https://example.com/search?q=northern%20wolves");
        assert_eq!(seed.unique_key, "search-Northern Wolves");
        assert_eq!(seed.payload.selected_team_index, Some(json!("2")));
    }

    #[test]
    fn test_drawer_url_wins_without_mode() {
        let plan = input(json!({
            "startUrl": "https://example.com/search?q=",
            "teamName": "Wolves",
            "drawerUrl": "https://example.com/draw"
        }))
        .resolve()
        .unwrap();
        assert_eq!(plan.mode(), RunMode::Scraper);
    }

    #[test]
    fn test_explicit_mode_requires_its_inputs() {
        let err = input(json!({"mode": "discover", "drawerUrl": "https://example.com/draw"}))
            .resolve()
            .unwrap_err();
        assert!(matches!(err, ConfigError::MissingInput("startUrl")));

        let err = input(json!({"mode": "scrape", "startUrl": "https://e.com/", "teamName": "x"}))
            .resolve()
            .unwrap_err();
        assert!(matches!(err, ConfigError::MissingInput("drawerUrl")));
    }

    #[test]
    fn test_missing_everything_is_an_error() {
        let err = CrawlInput::default().resolve().unwrap_err();
        assert!(matches!(err, ConfigError::MissingInput(_)));
        let err = input(json!({"teamName": "Wolves"})).resolve().unwrap_err();
        assert!(matches!(err, ConfigError::MissingInput(_)));
    }

    #[test]
    fn test_unknown_mode() {
        let err = input(json!({"mode": "crawl"})).resolve().unwrap_err();
        assert!(matches!(err, ConfigError::UnknownMode(_)));
    }

    #[test]
    fn test_query_placeholder() {
        let url = build_search_url("https://example.com/find/{query}/teams", "A&B").unwrap();
        assert_eq!(url, "https://example.com/find/a%26b/teams");
    }

    #[test]
    fn test_invalid_drawer_url() {
        let err = input(json!({"drawerUrl": "draw.html"})).resolve().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidUrl { field: "drawerUrl", .. }));
    }

    #[test]
    fn test_cli_overrides_replace_file_values() {
        let mut config = input(json!({"teamName": "Wolves", "maxRequestRetries": 5}));
        config.apply_overrides(InputOverrides {
            team_name: Some("Hawks".to_string()),
            selected_team_index: Some("3".to_string()),
            no_browser: true,
            ..Default::default()
        });
        assert_eq!(config.team_name.as_deref(), Some("Hawks"));
        assert_eq!(config.selected_team_index, Some(json!(3)));
        assert_eq!(config.max_request_retries(), 5);
        assert!(!config.browser.enabled);
    }

    #[test]
    fn test_defaults() {
        let config = CrawlInput::default();
        assert_eq!(config.max_request_retries(), DEFAULT_MAX_REQUEST_RETRIES);
        assert_eq!(config.user_agent(), DEFAULT_USER_AGENT);
        assert_eq!(config.request_timeout(), DEFAULT_REQUEST_TIMEOUT);
    }
}
