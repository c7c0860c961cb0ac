//! End-to-end crawl tests against saved pages.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::{json, Value};

use fixturecrawl::browser::{PageFetcher, RenderedPage};
use fixturecrawl::config::CrawlInput;
use fixturecrawl::crawler::{Crawler, CrawlerOptions};
use fixturecrawl::models::{ErrorKind, OutputRecord};
use fixturecrawl::queue::InMemoryJobQueue;
use fixturecrawl::router::RouterOptions;
use fixturecrawl::sink::{JsonLinesSink, MemorySink};
use fixturecrawl::FetchError;

const SEARCH_URL: &str = "https://www.example.com/search?q=wolves";
const TEAM_URL: &str = "https://www.example.com/Competitions/Competition/wolves-masters-202";
const DRAW_URL: &str = "https://www.example.com/Competitions/Competition/wolves-masters-202/Draw";

const SEARCH_HTML: &str = include_str!("fixtures/search.html");
const TEAM_HTML: &str = include_str!("fixtures/team.html");
const DRAW_HTML: &str = include_str!("fixtures/draw.html");
const SQUAD_HTML: &str = include_str!("fixtures/squad.html");
const EMPTY_HTML: &str = include_str!("fixtures/empty.html");

fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 10, 12, 0, 0).unwrap()
}

/// Serves canned pages by URL and records every request.
#[derive(Clone, Default)]
struct ScriptedFetcher {
    pages: HashMap<String, String>,
    requests: Arc<Mutex<Vec<String>>>,
}

impl ScriptedFetcher {
    fn page(mut self, url: &str, html: &str) -> Self {
        self.pages.insert(url.to_string(), html.to_string());
        self
    }

    fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl PageFetcher for ScriptedFetcher {
    async fn fetch(
        &mut self,
        url: &str,
        ready_selectors: &[&str],
    ) -> Result<RenderedPage, FetchError> {
        assert!(!ready_selectors.is_empty());
        self.requests.lock().unwrap().push(url.to_string());
        match self.pages.get(url) {
            Some(html) => Ok(RenderedPage {
                url: url.to_string(),
                final_url: url.to_string(),
                html: html.clone(),
            }),
            None => Err(FetchError::Timeout {
                url: url.to_string(),
                secs: 30,
            }),
        }
    }
}

fn options(stop_after_search: bool) -> CrawlerOptions {
    CrawlerOptions {
        max_request_retries: 1,
        retry_delay: Duration::ZERO,
        router: RouterOptions { stop_after_search },
    }
}

fn discover_input(index: Value) -> CrawlInput {
    serde_json::from_value(json!({
        "startUrl": "https://www.example.com/search?q=",
        "teamName": "Wolves",
        "selectedTeamIndex": index,
    }))
    .unwrap()
}

async fn crawl(fetcher: ScriptedFetcher, input: &CrawlInput) -> Vec<OutputRecord> {
    let plan = input.resolve().unwrap();
    let mut crawler = Crawler::new(
        fetcher,
        InMemoryJobQueue::new(),
        MemorySink::new(),
        options(input.stop_after_search),
    )
    .with_clock(fixed_now);
    crawler.run(vec![plan.seed_job()]).await.unwrap();
    crawler.into_sink().into_records()
}

fn to_values(records: &[OutputRecord]) -> Vec<Value> {
    records
        .iter()
        .map(|r| serde_json::to_value(r).unwrap())
        .collect()
}

fn full_site() -> ScriptedFetcher {
    ScriptedFetcher::default()
        .page(SEARCH_URL, SEARCH_HTML)
        .page(TEAM_URL, TEAM_HTML)
        .page(DRAW_URL, DRAW_HTML)
}

#[tokio::test]
async fn test_discover_walks_search_team_and_draw() {
    let fetcher = full_site();
    let records = crawl(fetcher.clone(), &discover_input(json!(1))).await;

    assert_eq!(fetcher.requests(), vec![SEARCH_URL, TEAM_URL, DRAW_URL]);

    let values = to_values(&records);
    let types: Vec<&str> = values.iter().map(|v| v["type"].as_str().unwrap()).collect();
    assert_eq!(
        types,
        vec!["team-option", "team-option", "team-option", "match", "match", "match"]
    );

    assert_eq!(values[0]["name"], "Northern Wolves");
    assert_eq!(values[1]["name"], "Wolves Masters");
    assert_eq!(values[1]["competition"], "Mens 40s - Spring 2026");
    assert_eq!(values[2]["name"], "Wolves Cup");
    assert_eq!(values[2]["resultType"], "Competition");

    let played = &values[3];
    assert_eq!(played["homeTeam"], "Wolves Masters");
    assert_eq!(played["gameStatus"], "Full Time");
    assert_eq!(played["isCompleted"], true);
    assert_eq!(played["homeScore"], 5);
    assert_eq!(played["dateTimeISO"], "2026-03-07T08:30:00Z");
    assert_eq!(played["matchUrl"], "https://www.example.com/Competitions/Match/5001");
    assert_eq!(played["matchUrlRelative"], "/Competitions/Match/5001");
    assert_eq!(played["sourceUrl"], DRAW_URL);

    let scored_only = &values[4];
    assert_eq!(scored_only["isCompleted"], true);
    assert_eq!(scored_only["gameStatus"], "Full Time");

    let upcoming = &values[5];
    assert_eq!(upcoming["isCompleted"], false);
    assert_eq!(upcoming["gameStatus"], "Upcoming");
    assert!(upcoming["homeScore"].is_null());
    assert!(upcoming["awayScore"].is_null());
}

#[tokio::test]
async fn test_invalid_index_selects_first_option() {
    let first_team = "https://www.example.com/Competitions/Competition/northern-wolves-101";
    let fetcher = ScriptedFetcher::default().page(SEARCH_URL, SEARCH_HTML);
    let records = crawl(fetcher.clone(), &discover_input(json!("seven"))).await;

    assert_eq!(fetcher.requests()[1], first_team);
    // The team page is not scripted, so it fails after one retry.
    let errors: Vec<_> = records.iter().filter_map(OutputRecord::as_error).collect();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].kind, ErrorKind::NavigationTimeout);
    assert_eq!(errors[0].url, first_team);
    assert_eq!(fetcher.requests().len(), 3);
}

#[tokio::test]
async fn test_stop_after_search_only_emits_options() {
    let fetcher = full_site();
    let mut input = discover_input(json!(0));
    input.stop_after_search = true;
    let records = crawl(fetcher.clone(), &input).await;

    assert_eq!(fetcher.requests(), vec![SEARCH_URL]);
    assert_eq!(records.len(), 3);
    assert!(records.iter().all(|r| r.type_name() == "team-option"));
}

#[tokio::test]
async fn test_empty_search_reports_no_results() {
    let fetcher = ScriptedFetcher::default().page(SEARCH_URL, EMPTY_HTML);
    let records = crawl(fetcher.clone(), &discover_input(json!(0))).await;

    assert_eq!(fetcher.requests().len(), 1);
    assert_eq!(records.len(), 1);
    let error = records[0].as_error().unwrap();
    assert_eq!(error.kind, ErrorKind::NoResultsFound);
    assert_eq!(error.context["teamName"], "Wolves");
    assert_eq!(error.context["pageTitle"], "Draw | Example Touch");
    let sample = error.context["htmlSample"].as_str().unwrap();
    assert!(sample.contains("Loading draw"));
}

#[tokio::test]
async fn test_scraper_mode_falls_back_to_roster() {
    let squad_url = "https://www.example.com/team/wolves/squad";
    let fetcher = ScriptedFetcher::default().page(squad_url, SQUAD_HTML);
    let input: CrawlInput = serde_json::from_value(json!({ "drawerUrl": squad_url })).unwrap();
    let records = crawl(fetcher, &input).await;

    let values = to_values(&records);
    let names: Vec<&str> = values.iter().map(|v| v["name"].as_str().unwrap()).collect();
    assert_eq!(names, vec!["Sam Lee", "Alex Kim", "Jo Park"]);
    assert!(values.iter().all(|v| v["type"] == "player"));
    assert_eq!(values[0]["position"], "Link");
    assert_eq!(values[0]["jerseyNumber"], "7");
    assert_eq!(values[2]["position"], "Unknown");
}

#[tokio::test]
async fn test_empty_draw_reports_no_data_with_sample() {
    let draw_url = "https://www.example.com/draw/empty";
    let fetcher = ScriptedFetcher::default().page(draw_url, EMPTY_HTML);
    let input: CrawlInput = serde_json::from_value(json!({ "drawerUrl": draw_url })).unwrap();
    let records = crawl(fetcher, &input).await;

    assert_eq!(records.len(), 1);
    let error = records[0].as_error().unwrap();
    assert_eq!(error.kind, ErrorKind::NoDataFound);
    let sample = error.context["htmlSample"].as_str().unwrap();
    assert!(sample.contains("Loading draw"));
    assert!(sample.chars().count() <= 2000);
}

#[tokio::test]
async fn test_team_page_without_drawer_is_scraped_in_place() {
    let fetcher = ScriptedFetcher::default()
        .page(SEARCH_URL, SEARCH_HTML)
        .page(TEAM_URL, DRAW_HTML);
    let records = crawl(fetcher.clone(), &discover_input(json!(1))).await;

    assert_eq!(fetcher.requests(), vec![SEARCH_URL, TEAM_URL]);
    let matches = records.iter().filter(|r| r.type_name() == "match").count();
    assert_eq!(matches, 3);
}

#[tokio::test]
async fn test_repeated_runs_are_identical() {
    let first = to_values(&crawl(full_site(), &discover_input(json!(1))).await);
    let second = to_values(&crawl(full_site(), &discover_input(json!(1))).await);
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_writes_json_lines_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("records.jsonl");

    let input = discover_input(json!(1));
    let plan = input.resolve().unwrap();
    let sink = JsonLinesSink::create(&path).await.unwrap();
    let mut crawler = Crawler::new(full_site(), InMemoryJobQueue::new(), sink, options(false))
        .with_clock(fixed_now);
    let summary = crawler.run(vec![plan.seed_job()]).await.unwrap();

    assert_eq!(summary.jobs_processed, 3);
    assert_eq!(summary.team_options, 3);
    assert_eq!(summary.matches, 3);

    let written = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<Value> = written
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(lines.len(), 6);
    assert_eq!(lines[5]["type"], "match");
    assert_eq!(lines[5]["scrapedAt"], "2026-03-10T12:00:00Z");
}
