//! CLI parser and dispatch.

mod config_cmd;
mod crawl;
mod extract;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use fixturecrawl::config::{load_input, InputOverrides, LoadOptions};

#[derive(Parser)]
#[command(name = "fixturecrawl")]
#[command(about = "Crawl sports-league draw pages into team, match and roster records")]
#[command(version)]
pub struct Cli {
    /// Config file path (overrides auto-discovery)
    #[arg(short, long, global = true, env = "FIXTURECRAWL_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

/// Input flags shared by commands that resolve a crawl plan.
#[derive(clap::Args, Debug, Default)]
pub struct InputArgs {
    /// Search endpoint; the team name is appended or replaces {query}
    #[arg(long)]
    start_url: Option<String>,

    /// Team to search for
    #[arg(long)]
    team_name: Option<String>,

    /// Which search result to follow (0-based)
    #[arg(long)]
    team_index: Option<String>,

    /// Draw page to scrape directly (scraper mode)
    #[arg(long)]
    drawer_url: Option<String>,

    /// Run mode: discover or scraper
    #[arg(long)]
    mode: Option<String>,

    /// Emit team options and stop
    #[arg(long)]
    stop_after_search: bool,

    /// Fetch retries per page
    #[arg(long)]
    max_retries: Option<u32>,

    /// Write JSON lines to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Fetch with plain HTTP instead of a browser
    #[arg(long)]
    no_browser: bool,

    /// Show the browser window
    #[arg(long)]
    headful: bool,
}

impl From<InputArgs> for InputOverrides {
    fn from(args: InputArgs) -> Self {
        Self {
            start_url: args.start_url,
            team_name: args.team_name,
            selected_team_index: args.team_index,
            drawer_url: args.drawer_url,
            mode: args.mode,
            stop_after_search: args.stop_after_search,
            max_request_retries: args.max_retries,
            output: args.output,
            no_browser: args.no_browser,
            headful: args.headful,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Run a crawl
    Crawl {
        #[command(flatten)]
        input: InputArgs,
    },

    /// Run one stage's extraction against a saved HTML file
    Extract {
        /// Stage to run: search, team-selection or scrape-draw
        #[arg(long, short)]
        stage: String,

        /// URL the page was loaded from (for resolving links)
        #[arg(long, short)]
        url: String,

        /// Team name, for search pages
        #[arg(long)]
        team_name: Option<String>,

        /// Saved page HTML
        file: PathBuf,
    },

    /// Show the resolved input and run mode
    Config {
        #[command(flatten)]
        input: InputArgs,
    },
}

pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let options = LoadOptions {
        config_path: cli.config,
    };

    match cli.command {
        Commands::Crawl { input } => {
            let mut config = load_input(&options).await?;
            config.apply_overrides(input.into());
            crawl::cmd_crawl(config).await
        }
        Commands::Extract {
            stage,
            url,
            team_name,
            file,
        } => extract::cmd_extract(&stage, &url, team_name, &file).await,
        Commands::Config { input } => {
            let mut config = load_input(&options).await?;
            config.apply_overrides(input.into());
            config_cmd::cmd_config(&config)
        }
    }
}
