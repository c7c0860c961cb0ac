//! Page rendering collaborators.
//!
//! The crawler only needs "load this URL and give me the HTML once it has
//! rendered". [`BrowserFetcher`] drives Chrome over CDP for script-built
//! pages; [`HttpFetcher`] is a plain HTTP fallback for static markup.

mod chrome;
mod http;

pub use chrome::BrowserFetcher;
pub use http::HttpFetcher;

use async_trait::async_trait;

use crate::error::FetchError;

/// A loaded page.
#[derive(Debug, Clone)]
pub struct RenderedPage {
    /// URL that was requested.
    pub url: String,
    /// URL after redirects.
    pub final_url: String,
    pub html: String,
}

impl RenderedPage {
    /// URL relative links on the page should resolve against.
    pub fn effective_url(&self) -> &str {
        if self.final_url.is_empty() {
            &self.url
        } else {
            &self.final_url
        }
    }
}

/// Loads pages for the crawler.
#[async_trait]
pub trait PageFetcher: Send {
    /// Load `url`, waiting for any of `ready_selectors` to appear when the
    /// fetcher can observe rendering. A selector that never appears is not
    /// an error.
    async fn fetch(&mut self, url: &str, ready_selectors: &[&str])
        -> Result<RenderedPage, FetchError>;

    /// Release any resources held by the fetcher.
    async fn close(&mut self) {}
}

#[async_trait]
impl<T: PageFetcher + ?Sized> PageFetcher for Box<T> {
    async fn fetch(
        &mut self,
        url: &str,
        ready_selectors: &[&str],
    ) -> Result<RenderedPage, FetchError> {
        (**self).fetch(url, ready_selectors).await
    }

    async fn close(&mut self) {
        (**self).close().await
    }
}
