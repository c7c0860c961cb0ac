//! Show the effective configuration.

use fixturecrawl::config::CrawlInput;

pub fn cmd_config(config: &CrawlInput) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(config)?);
    match config.resolve() {
        Ok(plan) => {
            let seed = plan.seed_job();
            println!();
            println!("Mode:  {}", plan.mode().as_str());
            println!("Start: {} ({})", seed.url, seed.stage);
        }
        Err(e) => println!("\nInput is not runnable: {}", e),
    }
    Ok(())
}
