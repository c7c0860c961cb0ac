//! Offline extraction against saved pages, for checking selectors.

use std::path::Path;

use anyhow::Context;
use chrono::Utc;
use tracing::info;

use fixturecrawl::browser::RenderedPage;
use fixturecrawl::extract::ExtractContext;
use fixturecrawl::models::{CrawlJob, JobPayload, Stage};
use fixturecrawl::router::StageRouter;
use fixturecrawl::sink::{JsonLinesSink, RecordSink};

pub async fn cmd_extract(
    stage: &str,
    url: &str,
    team_name: Option<String>,
    file: &Path,
) -> anyhow::Result<()> {
    let stage = Stage::from_str(stage)
        .with_context(|| format!("Unknown stage '{}' (search, team-selection, scrape-draw)", stage))?;
    let html = tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("Failed to read {}", file.display()))?;

    let payload = JobPayload {
        team_name,
        ..Default::default()
    };
    let job = match stage {
        Stage::Search => CrawlJob::search(url, payload),
        Stage::TeamSelection => CrawlJob::team_selection(url, payload),
        Stage::ScrapeDraw => CrawlJob::scrape_draw(url, payload),
    };
    let page = RenderedPage {
        url: url.to_string(),
        final_url: url.to_string(),
        html,
    };

    let outcome = StageRouter::default().route(&job, &page, &ExtractContext::at(Utc::now()));
    for follow_up in &outcome.follow_ups {
        info!("Would follow: {} {}", follow_up.stage, follow_up.url);
    }

    let mut sink = JsonLinesSink::stdout();
    for record in &outcome.records {
        sink.emit(record).await?;
    }
    sink.flush().await?;
    Ok(())
}
