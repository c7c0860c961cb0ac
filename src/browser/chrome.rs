//! Chrome-backed fetcher for pages assembled by client-side scripts.

#[cfg(feature = "browser")]
use std::path::PathBuf;
#[cfg(feature = "browser")]
use std::time::Duration;

use async_trait::async_trait;
#[cfg(feature = "browser")]
use tokio::task::JoinHandle;
#[cfg(feature = "browser")]
use tracing::{debug, info, warn};

#[cfg(feature = "browser")]
use chromiumoxide::cdp::browser_protocol::network::SetUserAgentOverrideParams;
#[cfg(feature = "browser")]
use chromiumoxide::cdp::browser_protocol::page::NavigateParams;
#[cfg(feature = "browser")]
use chromiumoxide::handler::Handler;
#[cfg(feature = "browser")]
use chromiumoxide::{Browser, BrowserConfig, Page};
#[cfg(feature = "browser")]
use futures::StreamExt;

use super::{PageFetcher, RenderedPage};
use crate::config::BrowserSettings;
use crate::error::FetchError;

/// Interval between checks for a readiness selector.
#[cfg(feature = "browser")]
const SELECTOR_POLL: Duration = Duration::from_millis(250);

#[cfg(feature = "browser")]
const WAIT_FOR_READY_SCRIPT: &str = r#"
    new Promise((resolve) => {
        if (document.readyState === 'complete' || document.readyState === 'interactive') {
            resolve(document.readyState);
        } else {
            document.addEventListener('DOMContentLoaded', () => resolve(document.readyState));
            setTimeout(() => resolve('timeout'), 10000);
        }
    })
"#;

#[cfg(feature = "browser")]
fn cdp_error(e: impl std::fmt::Display) -> FetchError {
    FetchError::Browser(e.to_string())
}

/// Renders pages in a launched or remote Chrome instance.
#[cfg(feature = "browser")]
pub struct BrowserFetcher {
    settings: BrowserSettings,
    user_agent: String,
    browser: Option<Browser>,
    handler_task: Option<JoinHandle<()>>,
    /// Whether the browser was launched by us (and should be closed by us).
    launched: bool,
}

#[cfg(feature = "browser")]
impl BrowserFetcher {
    /// Common Chrome executable paths to check.
    const CHROME_PATHS: &'static [&'static str] = &[
        "/usr/bin/google-chrome",
        "/usr/bin/google-chrome-stable",
        "/usr/bin/chromium",
        "/usr/bin/chromium-browser",
        "/snap/bin/chromium",
        "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
        "/Applications/Chromium.app/Contents/MacOS/Chromium",
        "/opt/google/chrome/google-chrome",
    ];

    pub fn new(settings: BrowserSettings, user_agent: impl Into<String>) -> Self {
        Self {
            settings,
            user_agent: user_agent.into(),
            browser: None,
            handler_task: None,
            launched: false,
        }
    }

    fn find_chrome() -> Result<PathBuf, FetchError> {
        for path in Self::CHROME_PATHS {
            let p = std::path::Path::new(path);
            if p.exists() {
                info!("Found Chrome at: {}", path);
                return Ok(p.to_path_buf());
            }
        }

        for cmd in &[
            "google-chrome",
            "google-chrome-stable",
            "chromium",
            "chromium-browser",
        ] {
            if let Ok(output) = std::process::Command::new("which").arg(cmd).output() {
                if output.status.success() {
                    let path = String::from_utf8_lossy(&output.stdout).trim().to_string();
                    if !path.is_empty() {
                        info!("Found Chrome in PATH: {}", path);
                        return Ok(PathBuf::from(path));
                    }
                }
            }
        }

        Err(FetchError::Browser(
            "Chrome/Chromium not found. Install it, set browser.remoteUrl, \
             or disable the browser to fall back to plain HTTP"
                .to_string(),
        ))
    }

    fn spawn_handler(&mut self, mut handler: Handler) {
        self.handler_task = Some(tokio::spawn(async move {
            while let Some(h) = handler.next().await {
                if h.is_err() {
                    break;
                }
            }
        }));
    }

    /// Launch or connect to a browser if not already running.
    async fn ensure_browser(&mut self) -> Result<&Browser, FetchError> {
        if self.browser.is_none() {
            let browser = match self.settings.remote_url.clone() {
                Some(remote_url) => self.connect_remote(&remote_url).await?,
                None => self.launch().await?,
            };
            self.browser = Some(browser);
        }
        self.browser
            .as_ref()
            .ok_or_else(|| FetchError::Browser("browser did not start".to_string()))
    }

    async fn launch(&mut self) -> Result<Browser, FetchError> {
        info!("Launching browser (headless={})", self.settings.headless);
        let chrome_path = Self::find_chrome()?;

        let mut builder = BrowserConfig::builder()
            .chrome_executable(chrome_path)
            .request_timeout(Duration::from_secs(self.settings.timeout));

        // with_head means NOT headless
        if !self.settings.headless {
            builder = builder.with_head();
        }

        builder = builder
            .arg("--disable-blink-features=AutomationControlled")
            .arg("--disable-dev-shm-usage")
            .arg("--no-first-run")
            .arg("--no-default-browser-check")
            .arg("--disable-background-networking")
            .arg("--disable-sync")
            .arg("--no-sandbox")
            .arg("--disable-gpu");

        for arg in &self.settings.chrome_args {
            builder = builder.arg(arg);
        }

        let config = builder
            .build()
            .map_err(|e| FetchError::Browser(format!("Failed to build browser config: {}", e)))?;

        let (browser, handler) = Browser::launch(config).await.map_err(cdp_error)?;
        self.spawn_handler(handler);
        self.launched = true;
        Ok(browser)
    }

    /// Connect to a remote Chrome instance via its /json/version endpoint.
    async fn connect_remote(&mut self, url: &str) -> Result<Browser, FetchError> {
        info!(
            "Connecting to remote browser at {} (timeout: {}s)",
            url, self.settings.timeout
        );

        let http_url = url
            .replace("ws://", "http://")
            .replace("wss://", "https://");
        let version_url = format!("{}/json/version", http_url.trim_end_matches('/'));

        let resp: serde_json::Value = reqwest::Client::new()
            .get(&version_url)
            .send()
            .await?
            .json()
            .await?;

        let ws_url = resp
            .get("webSocketDebuggerUrl")
            .and_then(|v| v.as_str())
            .ok_or_else(|| FetchError::Browser("No webSocketDebuggerUrl in response".to_string()))?;

        info!("Connecting to WebSocket: {}", ws_url);

        let handler_config = chromiumoxide::handler::HandlerConfig {
            request_timeout: Duration::from_secs(self.settings.timeout),
            ..Default::default()
        };

        let (browser, handler) = Browser::connect_with_config(ws_url, handler_config)
            .await
            .map_err(cdp_error)?;
        self.spawn_handler(handler);
        Ok(browser)
    }

    async fn load(
        &self,
        page: &Page,
        url: &str,
        ready_selectors: &[&str],
    ) -> Result<RenderedPage, FetchError> {
        page.execute(SetUserAgentOverrideParams::new(self.user_agent.clone()))
            .await
            .map_err(cdp_error)?;

        info!("Navigating to {}", url);
        let nav_params = NavigateParams::builder()
            .url(url)
            .build()
            .map_err(|e| FetchError::Navigation {
                url: url.to_string(),
                message: e,
            })?;

        let timeout = Duration::from_secs(self.settings.timeout);
        match tokio::time::timeout(timeout, page.execute(nav_params)).await {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => {
                return Err(FetchError::Navigation {
                    url: url.to_string(),
                    message: e.to_string(),
                })
            }
            Err(_) => {
                return Err(FetchError::Timeout {
                    url: url.to_string(),
                    secs: self.settings.timeout,
                })
            }
        }

        match tokio::time::timeout(timeout, page.evaluate(WAIT_FOR_READY_SCRIPT.to_string())).await
        {
            Ok(Ok(result)) => {
                let state: String = result
                    .into_value()
                    .unwrap_or_else(|_| "unknown".to_string());
                debug!("Page ready state: {}", state);
            }
            Ok(Err(e)) => debug!("Could not check ready state: {}", e),
            Err(_) => warn!("Timeout waiting for page ready state"),
        }

        tokio::time::sleep(Duration::from_millis(self.settings.settle_ms)).await;
        self.wait_for_any(page, ready_selectors, timeout).await;

        let final_url = page
            .url()
            .await
            .map_err(cdp_error)?
            .map(|u| u.to_string())
            .unwrap_or_else(|| url.to_string());
        let html = page.content().await.map_err(cdp_error)?;

        Ok(RenderedPage {
            url: url.to_string(),
            final_url,
            html,
        })
    }

    /// Poll until one of `selectors` is present or `timeout` elapses.
    async fn wait_for_any(&self, page: &Page, selectors: &[&str], timeout: Duration) -> bool {
        if selectors.is_empty() {
            return true;
        }
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            for selector in selectors {
                if page.find_element(*selector).await.is_ok() {
                    debug!("Ready selector found: {}", selector);
                    return true;
                }
            }
            if tokio::time::Instant::now() >= deadline {
                warn!("None of the ready selectors appeared: {:?}", selectors);
                return false;
            }
            tokio::time::sleep(SELECTOR_POLL).await;
        }
    }
}

#[cfg(feature = "browser")]
#[async_trait]
impl PageFetcher for BrowserFetcher {
    async fn fetch(
        &mut self,
        url: &str,
        ready_selectors: &[&str],
    ) -> Result<RenderedPage, FetchError> {
        let page = self
            .ensure_browser()
            .await?
            .new_page("about:blank")
            .await
            .map_err(cdp_error)?;

        let result = self.load(&page, url, ready_selectors).await;
        if let Err(e) = page.close().await {
            debug!("Failed to close page: {}", e);
        }
        result
    }

    async fn close(&mut self) {
        if let Some(mut browser) = self.browser.take() {
            if self.launched {
                if let Err(e) = browser.close().await {
                    debug!("Failed to close browser: {}", e);
                }
                let _ = browser.wait().await;
            }
        }
        if let Some(task) = self.handler_task.take() {
            task.abort();
        }
    }
}

// Stub for when browser feature is disabled
#[cfg(not(feature = "browser"))]
pub struct BrowserFetcher {
    _settings: BrowserSettings,
}

#[cfg(not(feature = "browser"))]
impl BrowserFetcher {
    pub fn new(settings: BrowserSettings, _user_agent: impl Into<String>) -> Self {
        Self {
            _settings: settings,
        }
    }
}

#[cfg(not(feature = "browser"))]
#[async_trait]
impl PageFetcher for BrowserFetcher {
    async fn fetch(
        &mut self,
        _url: &str,
        _ready_selectors: &[&str],
    ) -> Result<RenderedPage, FetchError> {
        Err(FetchError::Browser(
            "Browser support not compiled. Rebuild with: cargo build --features browser"
                .to_string(),
        ))
    }
}
