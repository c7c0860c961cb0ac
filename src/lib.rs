//! fixturecrawl - staged crawler for sports-league draw pages.
//!
//! A run starts either from a team-name search (discover mode) or from a
//! known draw page (scraper mode) and emits team options, match fixtures,
//! roster players and structured error records.

#![allow(clippy::should_implement_trait)]

pub mod browser;
pub mod config;
pub mod crawler;
pub mod dedup;
pub mod error;
pub mod extract;
pub mod models;
pub mod normalize;
pub mod queue;
pub mod router;
pub mod sink;

pub use crawler::{Crawler, CrawlerOptions, CrawlSummary};
pub use error::{ConfigError, CrawlError, FetchError, QueueError, SinkError};
