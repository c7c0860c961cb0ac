//! Crawl job queue.

use std::collections::{HashSet, VecDeque};

use async_trait::async_trait;

use crate::error::QueueError;
use crate::models::CrawlJob;

/// Ordered store of pending jobs that drops repeat unique keys.
#[async_trait]
pub trait JobQueue: Send {
    /// Add a job. Returns false if a job with the same unique key was
    /// already submitted.
    async fn enqueue(&mut self, job: CrawlJob) -> Result<bool, QueueError>;

    /// Next pending job in submission order.
    async fn next(&mut self) -> Result<Option<CrawlJob>, QueueError>;

    /// Number of jobs still pending.
    async fn pending(&self) -> Result<usize, QueueError>;
}

/// FIFO queue held in memory for the lifetime of one run.
#[derive(Debug, Default)]
pub struct InMemoryJobQueue {
    pending: VecDeque<CrawlJob>,
    seen: HashSet<String>,
}

impl InMemoryJobQueue {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl JobQueue for InMemoryJobQueue {
    async fn enqueue(&mut self, job: CrawlJob) -> Result<bool, QueueError> {
        if !self.seen.insert(job.unique_key.clone()) {
            return Ok(false);
        }
        self.pending.push_back(job);
        Ok(true)
    }

    async fn next(&mut self) -> Result<Option<CrawlJob>, QueueError> {
        Ok(self.pending.pop_front())
    }

    async fn pending(&self) -> Result<usize, QueueError> {
        Ok(self.pending.len())
    }
}
