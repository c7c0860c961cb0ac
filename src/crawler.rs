//! Crawl orchestration: pumps the job queue through fetcher, router and sink.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::browser::{PageFetcher, RenderedPage};
use crate::config::DEFAULT_MAX_REQUEST_RETRIES;
use crate::error::{CrawlError, FetchError};
use crate::extract::ExtractContext;
use crate::models::{CrawlJob, ErrorRecord, OutputRecord};
use crate::queue::JobQueue;
use crate::router::{RouterOptions, StageRouter};
use crate::sink::RecordSink;

/// Source of the reference time handed to extraction.
pub type Clock = fn() -> DateTime<Utc>;

/// Counts for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlSummary {
    pub jobs_processed: usize,
    pub jobs_skipped: usize,
    pub team_options: usize,
    pub matches: usize,
    pub players: usize,
    pub errors: usize,
}

impl CrawlSummary {
    fn count(&mut self, record: &OutputRecord) {
        match record {
            OutputRecord::TeamOption(_) => self.team_options += 1,
            OutputRecord::Match(_) => self.matches += 1,
            OutputRecord::Player(_) => self.players += 1,
            OutputRecord::Error(_) => self.errors += 1,
        }
    }

    pub fn records(&self) -> usize {
        self.team_options + self.matches + self.players + self.errors
    }
}

impl fmt::Display for CrawlSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} job(s), {} skipped, {} team option(s), {} match(es), {} player(s), {} error(s)",
            self.jobs_processed,
            self.jobs_skipped,
            self.team_options,
            self.matches,
            self.players,
            self.errors
        )
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CrawlerOptions {
    /// Attempts after the first before a page is reported as failed.
    pub max_request_retries: u32,
    /// Base delay between attempts; grows linearly per attempt.
    pub retry_delay: Duration,
    pub router: RouterOptions,
}

impl CrawlerOptions {
    /// Total fetch attempts per page, counting the first.
    pub fn attempts(&self) -> u32 {
        self.max_request_retries.saturating_add(1)
    }
}

impl Default for CrawlerOptions {
    fn default() -> Self {
        Self {
            max_request_retries: DEFAULT_MAX_REQUEST_RETRIES,
            retry_delay: Duration::from_secs(1),
            router: RouterOptions::default(),
        }
    }
}

/// Runs jobs one at a time until the queue is drained.
pub struct Crawler<F, Q, S> {
    fetcher: F,
    queue: Q,
    sink: S,
    router: StageRouter,
    options: CrawlerOptions,
    clock: Clock,
}

impl<F, Q, S> Crawler<F, Q, S>
where
    F: PageFetcher,
    Q: JobQueue,
    S: RecordSink,
{
    pub fn new(fetcher: F, queue: Q, sink: S, options: CrawlerOptions) -> Self {
        Self {
            fetcher,
            queue,
            sink,
            router: StageRouter::new(options.router),
            options,
            clock: Utc::now,
        }
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Enqueue `seeds` and process jobs until none remain.
    ///
    /// Page failures become error records and the crawl moves on; only
    /// queue and sink failures abort the run. The sink is flushed and the
    /// fetcher closed on every exit path.
    pub async fn run(&mut self, seeds: Vec<CrawlJob>) -> Result<CrawlSummary, CrawlError> {
        let mut summary = CrawlSummary::default();
        let drained = self.drain(seeds, &mut summary).await;
        let flushed = self.sink.flush().await;
        self.fetcher.close().await;
        drained?;
        flushed?;
        info!("Crawl finished: {}", summary);
        Ok(summary)
    }

    async fn drain(
        &mut self,
        seeds: Vec<CrawlJob>,
        summary: &mut CrawlSummary,
    ) -> Result<(), CrawlError> {
        for seed in seeds {
            self.queue.enqueue(seed).await?;
        }

        while let Some(job) = self.queue.next().await? {
            info!("Processing stage: {} ({})", job.stage, job.url);
            summary.jobs_processed += 1;

            let now = (self.clock)();
            let records = match self.fetch_with_retries(&job).await {
                Ok(page) => {
                    let outcome = self.router.route(&job, &page, &ExtractContext::at(now));
                    for follow_up in outcome.follow_ups {
                        let key = follow_up.unique_key.clone();
                        if !self.queue.enqueue(follow_up).await? {
                            debug!("Skipping already queued job {}", key);
                            summary.jobs_skipped += 1;
                        }
                    }
                    outcome.records
                }
                Err(e) => {
                    warn!("Giving up on {}: {}", job.url, e);
                    vec![OutputRecord::Error(ErrorRecord::navigation_timeout(
                        &job.url,
                        job.stage,
                        self.options.attempts(),
                        &e.to_string(),
                        now,
                    ))]
                }
            };

            for record in &records {
                self.sink.emit(record).await?;
                summary.count(record);
            }
        }
        Ok(())
    }

    async fn fetch_with_retries(&mut self, job: &CrawlJob) -> Result<RenderedPage, FetchError> {
        let ready = job.stage.ready_selectors();
        let mut attempt = 0u32;
        loop {
            match self.fetcher.fetch(&job.url, ready).await {
                Ok(page) => return Ok(page),
                Err(e) if attempt < self.options.max_request_retries => {
                    attempt += 1;
                    warn!(
                        "Fetch of {} failed ({}), retry {}/{}",
                        job.url, e, attempt, self.options.max_request_retries
                    );
                    tokio::time::sleep(self.options.retry_delay * attempt).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    pub fn into_sink(self) -> S {
        self.sink
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SinkError;
    use crate::models::{ErrorKind, JobPayload, Stage};
    use crate::queue::InMemoryJobQueue;
    use crate::sink::MemorySink;
    use async_trait::async_trait;
    use chrono::TimeZone;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 10, 12, 0, 0).unwrap()
    }

    /// Fails a set number of times, then serves a fixed page.
    struct FlakyFetcher {
        failures: u32,
        calls: u32,
        html: &'static str,
    }

    #[async_trait]
    impl PageFetcher for FlakyFetcher {
        async fn fetch(
            &mut self,
            url: &str,
            _ready_selectors: &[&str],
        ) -> Result<RenderedPage, FetchError> {
            self.calls += 1;
            if self.calls <= self.failures {
                return Err(FetchError::Timeout {
                    url: url.to_string(),
                    secs: 30,
                });
            }
            Ok(RenderedPage {
                url: url.to_string(),
                final_url: url.to_string(),
                html: self.html.to_string(),
            })
        }
    }

    fn options(retries: u32) -> CrawlerOptions {
        CrawlerOptions {
            max_request_retries: retries,
            retry_delay: Duration::ZERO,
            router: RouterOptions::default(),
        }
    }

    const DRAW: &str = r#"<ul class="l-grid"><li>
        <div class="match-team__name--home">Wolves</div>
        <div class="match-team__name--away">Hawks</div></li></ul>"#;

    fn seed() -> CrawlJob {
        CrawlJob::scrape_draw("https://example.com/draw", JobPayload::default())
    }

    #[tokio::test]
    async fn test_retries_then_succeeds() {
        let fetcher = FlakyFetcher {
            failures: 2,
            calls: 0,
            html: DRAW,
        };
        let mut crawler = Crawler::new(fetcher, InMemoryJobQueue::new(), MemorySink::new(), options(2))
            .with_clock(fixed_now);
        let summary = crawler.run(vec![seed()]).await.unwrap();
        assert_eq!(summary.matches, 1);
        assert_eq!(summary.errors, 0);
        assert_eq!(crawler.fetcher.calls, 3);
    }

    #[tokio::test]
    async fn test_exhausted_retries_emit_navigation_timeout() {
        let fetcher = FlakyFetcher {
            failures: 10,
            calls: 0,
            html: DRAW,
        };
        let mut crawler = Crawler::new(fetcher, InMemoryJobQueue::new(), MemorySink::new(), options(1))
            .with_clock(fixed_now);
        let summary = crawler.run(vec![seed()]).await.unwrap();
        assert_eq!(summary.errors, 1);
        assert_eq!(crawler.fetcher.calls, 2);

        let records = crawler.into_sink().into_records();
        let error = records[0].as_error().unwrap();
        assert_eq!(error.kind, ErrorKind::NavigationTimeout);
        assert_eq!(error.url, "https://example.com/draw");
        assert_eq!(error.context["stage"], Stage::ScrapeDraw.as_str());
        assert_eq!(error.scraped_at, fixed_now());
    }

    /// Accepts one record, then fails every write.
    #[derive(Default)]
    struct BrokenSink {
        emitted: usize,
        flushes: usize,
    }

    #[async_trait]
    impl RecordSink for BrokenSink {
        async fn emit(&mut self, _record: &OutputRecord) -> Result<(), SinkError> {
            if self.emitted == 1 {
                return Err(SinkError::Io(std::io::Error::other("disk full")));
            }
            self.emitted += 1;
            Ok(())
        }

        async fn flush(&mut self) -> Result<(), SinkError> {
            self.flushes += 1;
            Ok(())
        }
    }

    const DOUBLE_DRAW: &str = r#"<ul class="l-grid">
        <li><div class="match-team__name--home">Wolves</div>
            <div class="match-team__name--away">Hawks</div></li>
        <li><div class="match-team__name--home">Lions</div>
            <div class="match-team__name--away">Bears</div></li></ul>"#;

    #[tokio::test]
    async fn test_sink_failure_still_flushes() {
        let fetcher = FlakyFetcher {
            failures: 0,
            calls: 0,
            html: DOUBLE_DRAW,
        };
        let mut crawler = Crawler::new(fetcher, InMemoryJobQueue::new(), BrokenSink::default(), options(0))
            .with_clock(fixed_now);
        let result = crawler.run(vec![seed()]).await;
        assert!(matches!(result, Err(CrawlError::Sink(_))));

        let sink = crawler.into_sink();
        assert_eq!(sink.emitted, 1);
        assert_eq!(sink.flushes, 1);
    }

    #[test]
    fn test_attempts_saturate() {
        assert_eq!(options(2).attempts(), 3);
        assert_eq!(options(u32::MAX).attempts(), u32::MAX);
    }

    #[test]
    fn test_summary_display_includes_skipped_jobs() {
        let summary = CrawlSummary {
            jobs_processed: 3,
            jobs_skipped: 2,
            team_options: 1,
            matches: 4,
            players: 0,
            errors: 1,
        };
        assert_eq!(
            summary.to_string(),
            "3 job(s), 2 skipped, 1 team option(s), 4 match(es), 0 player(s), 1 error(s)"
        );
    }

    #[tokio::test]
    async fn test_duplicate_seeds_run_once() {
        let fetcher = FlakyFetcher {
            failures: 0,
            calls: 0,
            html: DRAW,
        };
        let mut crawler = Crawler::new(fetcher, InMemoryJobQueue::new(), MemorySink::new(), options(0));
        let summary = crawler.run(vec![seed(), seed()]).await.unwrap();
        assert_eq!(summary.jobs_processed, 1);
        assert_eq!(summary.records(), 1);
    }
}
