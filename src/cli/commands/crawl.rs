//! The crawl command.

use anyhow::Context;
use chrono::Utc;
use tracing::{info, warn};

use fixturecrawl::browser::{BrowserFetcher, HttpFetcher, PageFetcher};
use fixturecrawl::config::CrawlInput;
use fixturecrawl::crawler::{Crawler, CrawlerOptions};
use fixturecrawl::models::{ErrorRecord, OutputRecord};
use fixturecrawl::queue::InMemoryJobQueue;
use fixturecrawl::router::RouterOptions;
use fixturecrawl::sink::{JsonLinesSink, RecordSink};

async fn open_sink(config: &CrawlInput) -> anyhow::Result<Box<dyn RecordSink>> {
    Ok(match &config.output {
        Some(path) => {
            info!("Writing records to {}", path.display());
            Box::new(
                JsonLinesSink::create(path)
                    .await
                    .with_context(|| format!("Failed to open output {}", path.display()))?,
            )
        }
        None => Box::new(JsonLinesSink::stdout()),
    })
}

fn build_fetcher(config: &CrawlInput) -> anyhow::Result<Box<dyn PageFetcher>> {
    if config.browser.enabled {
        info!("Rendering pages with Chrome");
        return Ok(Box::new(BrowserFetcher::new(
            config.browser.clone(),
            config.user_agent(),
        )));
    }
    info!("Fetching pages over plain HTTP");
    let fetcher = HttpFetcher::new(config.user_agent(), config.request_timeout())
        .context("Failed to build HTTP client")?;
    Ok(Box::new(fetcher))
}

pub async fn cmd_crawl(config: CrawlInput) -> anyhow::Result<()> {
    let mut sink = open_sink(&config).await?;

    let plan = match config.resolve() {
        Ok(plan) => plan,
        Err(e) => {
            let record = OutputRecord::Error(ErrorRecord::configuration(e.to_string(), Utc::now()));
            sink.emit(&record).await?;
            sink.flush().await?;
            return Err(e).context("Invalid crawl input");
        }
    };
    info!("Running in {} mode", plan.mode().as_str());

    let options = CrawlerOptions {
        max_request_retries: config.max_request_retries(),
        router: RouterOptions {
            stop_after_search: config.stop_after_search,
        },
        ..Default::default()
    };

    let mut crawler = Crawler::new(build_fetcher(&config)?, InMemoryJobQueue::new(), sink, options);
    let summary = crawler.run(vec![plan.seed_job()]).await?;

    if summary.errors > 0 {
        warn!("Crawl finished with {} error record(s)", summary.errors);
    }
    eprintln!("{}", summary);
    Ok(())
}
