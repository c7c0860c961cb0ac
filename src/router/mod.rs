//! Stage dispatch: turns a loaded page into records and follow-up jobs.

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::browser::RenderedPage;
use crate::extract::{
    extract_draw, extract_team_options, find_drawer_link, DrawContents, Document, ExtractContext,
    HTML_SAMPLE_CHARS,
};
use crate::models::{CrawlJob, ErrorRecord, JobPayload, OutputRecord, RosterEntry, Stage};

/// Options that change how stages hand off to each other.
#[derive(Debug, Clone, Copy, Default)]
pub struct RouterOptions {
    /// Emit the team options from search and do not go further.
    pub stop_after_search: bool,
}

/// What handling one job produced.
#[derive(Debug, Default)]
pub struct StageOutcome {
    pub records: Vec<OutputRecord>,
    pub follow_ups: Vec<CrawlJob>,
}

impl StageOutcome {
    fn record(mut self, record: OutputRecord) -> Self {
        self.records.push(record);
        self
    }

    fn follow(mut self, job: CrawlJob) -> Self {
        self.follow_ups.push(job);
        self
    }
}

/// Resolve a user supplied selection index against `count` options.
///
/// Integers, whole floats such as `1.0` and numeric strings in `0..count`
/// are honoured; anything else selects the first option.
pub fn resolve_selection_index(raw: Option<&Value>, count: usize) -> usize {
    let parsed = match raw {
        Some(Value::Number(n)) => n.as_u64().or_else(|| n.as_f64().and_then(whole_number)),
        Some(Value::String(s)) => {
            let s = s.trim();
            s.parse::<u64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().and_then(whole_number))
        }
        _ => None,
    };
    let Some(index) = parsed else {
        if let Some(value) = raw {
            warn!("Selected team index {} is not a valid index, using 0", value);
        }
        return 0;
    };
    match usize::try_from(index) {
        Ok(index) if index < count => index,
        _ => {
            warn!(
                "Selected team index {} out of range for {} option(s), using 0",
                index, count
            );
            0
        }
    }
}

/// `1.0` reads as 1; fractional, negative and non-finite values do not.
fn whole_number(value: f64) -> Option<u64> {
    (value.is_finite() && value >= 0.0 && value.fract() == 0.0 && value <= u64::MAX as f64)
        .then_some(value as u64)
}

#[derive(Debug, Clone, Default)]
pub struct StageRouter {
    options: RouterOptions,
}

impl StageRouter {
    pub fn new(options: RouterOptions) -> Self {
        Self { options }
    }

    /// Handle one loaded page for the job's stage.
    pub fn route(&self, job: &CrawlJob, page: &RenderedPage, ctx: &ExtractContext) -> StageOutcome {
        let doc = Document::parse(&page.html, page.effective_url());
        debug!(
            "Routing {} ({} bytes) to stage {}",
            doc.url(),
            page.html.len(),
            job.stage
        );
        match job.stage {
            Stage::Search => self.search(job, &doc, ctx),
            Stage::TeamSelection => self.team_selection(job, &doc, ctx),
            Stage::ScrapeDraw => self.scrape_draw(&doc, ctx),
        }
    }

    fn search(&self, job: &CrawlJob, doc: &Document, ctx: &ExtractContext) -> StageOutcome {
        let options = extract_team_options(doc);
        let team_name = job.payload.team_name.as_deref();

        if options.is_empty() {
            warn!(
                "No search results for '{}' at {}",
                team_name.unwrap_or_default(),
                doc.url()
            );
            return StageOutcome::default().record(OutputRecord::Error(ErrorRecord::no_results(
                doc.url(),
                team_name,
                &doc.title(),
                doc.html_sample(HTML_SAMPLE_CHARS),
                ctx.now,
            )));
        }

        info!("Found {} team option(s)", options.len());
        for (i, option) in options.iter().enumerate() {
            info!(
                "Option {}: {} ({}) [{}] - {}",
                i, option.name, option.competition, option.result_type, option.url
            );
        }
        let index = resolve_selection_index(job.payload.selected_team_index.as_ref(), options.len());
        let selected = &options[index];

        let mut outcome = StageOutcome::default();
        if self.options.stop_after_search {
            info!("Stopping after search");
        } else {
            info!("Selecting team {}: {} ({})", index, selected.name, selected.url);
            let payload = JobPayload {
                selected_team: Some(selected.name.clone()),
                ..job.payload.clone()
            };
            outcome = outcome.follow(CrawlJob::team_selection(selected.url.clone(), payload));
        }

        for option in options {
            outcome = outcome.record(OutputRecord::TeamOption(option));
        }
        outcome
    }

    fn team_selection(&self, job: &CrawlJob, doc: &Document, ctx: &ExtractContext) -> StageOutcome {
        let link = find_drawer_link(doc);
        if link.found {
            info!("Found drawer link '{}': {}", link.link_text, link.url);
            return StageOutcome::default()
                .follow(CrawlJob::scrape_draw(link.url, job.payload.clone()));
        }

        info!("No drawer link on {}, scraping the page directly", doc.url());
        self.scrape_draw(doc, ctx)
    }

    fn scrape_draw(&self, doc: &Document, ctx: &ExtractContext) -> StageOutcome {
        match extract_draw(doc, ctx) {
            DrawContents::Matches(matches) => {
                info!("Extracted {} match(es) from {}", matches.len(), doc.url());
                StageOutcome {
                    records: matches.into_iter().map(OutputRecord::Match).collect(),
                    follow_ups: Vec::new(),
                }
            }
            DrawContents::Roster(players) => {
                info!("Extracted {} player(s) from {}", players.len(), doc.url());
                StageOutcome {
                    records: players
                        .into_iter()
                        .map(|player| {
                            OutputRecord::Player(RosterEntry {
                                player,
                                source_url: doc.url().to_string(),
                                scraped_at: ctx.now,
                            })
                        })
                        .collect(),
                    follow_ups: Vec::new(),
                }
            }
            DrawContents::Empty => {
                warn!("No match or roster data on {}", doc.url());
                StageOutcome::default().record(OutputRecord::Error(ErrorRecord::no_data(
                    doc.url(),
                    doc.html_sample(HTML_SAMPLE_CHARS),
                    ctx.now,
                )))
            }
        }
    }
}
