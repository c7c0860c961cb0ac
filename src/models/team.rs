//! Team search results and drawer links.

use serde::{Deserialize, Serialize};

/// A candidate team/competition entry found on a search results page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamOption {
    pub name: String,
    /// Absolute URL of the team or competition page.
    pub url: String,
    #[serde(default)]
    pub competition: String,
    /// Result category label, e.g. "Team".
    #[serde(default)]
    pub result_type: String,
}

impl TeamOption {
    /// Whether this result is labelled as a team (or carries no label at all).
    pub fn is_team_result(&self) -> bool {
        self.result_type.is_empty() || self.result_type.eq_ignore_ascii_case("team")
    }
}

/// The navigation link on a team page that leads to its draw or roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawerLink {
    pub found: bool,
    pub url: String,
    pub link_text: String,
}

impl DrawerLink {
    pub fn not_found(page_url: &str) -> Self {
        Self {
            found: false,
            url: page_url.to_string(),
            link_text: String::new(),
        }
    }
}
