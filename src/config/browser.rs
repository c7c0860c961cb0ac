//! Browser rendering settings.

use serde::{Deserialize, Serialize};

use super::env_var;

/// How pages are rendered when the browser fetcher is in use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrowserSettings {
    /// Render pages in Chrome. When false, plain HTTP is used.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Run in headless mode (default: true).
    #[serde(default = "default_headless")]
    pub headless: bool,

    /// Navigation and readiness timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Remote Chrome DevTools URL (e.g., "ws://localhost:9222").
    /// If set, connects to an existing browser instead of launching one.
    #[serde(default)]
    pub remote_url: Option<String>,

    /// Additional Chrome arguments.
    #[serde(default)]
    pub chrome_args: Vec<String>,

    /// Delay after the document is ready, for late scripts.
    #[serde(default = "default_settle_ms")]
    pub settle_ms: u64,
}

fn default_enabled() -> bool {
    cfg!(feature = "browser")
}

fn default_headless() -> bool {
    true
}

pub fn default_timeout() -> u64 {
    30
}

fn default_settle_ms() -> u64 {
    500
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            headless: default_headless(),
            timeout: default_timeout(),
            remote_url: None,
            chrome_args: Vec::new(),
            settle_ms: default_settle_ms(),
        }
    }
}

impl BrowserSettings {
    /// Apply `BROWSER_URL` if set.
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(url) = env_var("BROWSER_URL") {
            self.remote_url = Some(url);
        }
        self
    }
}
