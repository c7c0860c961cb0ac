//! Data models for fixturecrawl.

mod crawl;
mod fixture;
mod record;
mod team;

pub use crawl::{CrawlJob, JobPayload, Stage};
pub use fixture::{Match, Player, RosterEntry, UNKNOWN};
pub use record::{ErrorKind, ErrorRecord, OutputRecord};
pub use team::{DrawerLink, TeamOption};
