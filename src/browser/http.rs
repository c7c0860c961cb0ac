//! Plain HTTP fetcher for pages that render server-side.

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use super::{PageFetcher, RenderedPage};
use crate::error::FetchError;

pub struct HttpFetcher {
    client: reqwest::Client,
    timeout_secs: u64,
}

impl HttpFetcher {
    pub fn new(user_agent: &str, timeout_secs: u64) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(Duration::from_secs(timeout_secs))
            .cookie_store(true)
            .gzip(true)
            .brotli(true)
            .build()?;
        Ok(Self {
            client,
            timeout_secs,
        })
    }

    fn classify(&self, url: &str, err: reqwest::Error) -> FetchError {
        if err.is_timeout() {
            FetchError::Timeout {
                url: url.to_string(),
                secs: self.timeout_secs,
            }
        } else {
            FetchError::Http(err)
        }
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(
        &mut self,
        url: &str,
        _ready_selectors: &[&str],
    ) -> Result<RenderedPage, FetchError> {
        debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| self.classify(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let final_url = response.url().to_string();
        let html = response.text().await.map_err(|e| self.classify(url, e))?;
        Ok(RenderedPage {
            url: url.to_string(),
            final_url,
            html,
        })
    }
}
