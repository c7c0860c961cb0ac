//! Config file discovery and parsing.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::CrawlInput;
use crate::error::ConfigError;

/// Options for loading crawl input.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Explicit config file path (overrides discovery).
    pub config_path: Option<PathBuf>,
}

/// Load input from the configured or discovered file, then apply
/// environment overrides.
///
/// An explicit path that cannot be read is an error; a discovered file that
/// fails to parse is too. No file at all yields defaults.
pub async fn load_input(options: &LoadOptions) -> Result<CrawlInput, ConfigError> {
    let input = match &options.config_path {
        Some(path) => {
            let expanded = shellexpand::tilde(&path.to_string_lossy()).into_owned();
            load_from_path(Path::new(&expanded)).await?
        }
        None => discover().await?,
    };
    Ok(input.with_env_overrides())
}

async fn discover() -> Result<CrawlInput, ConfigError> {
    match prefer::load("fixturecrawl").await {
        Ok(pref_config) => match pref_config.source_path() {
            Some(path) => load_from_path(path).await,
            None => Ok(CrawlInput::default()),
        },
        Err(e) => {
            debug!("No config file discovered: {}", e);
            Ok(CrawlInput::default())
        }
    }
}

/// Parse a config file, choosing the format by extension (JSON by default).
pub async fn load_from_path(path: &Path) -> Result<CrawlInput, ConfigError> {
    let contents = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("json");
    let parsed = match ext {
        "toml" => toml::from_str::<CrawlInput>(&contents).map_err(|e| e.to_string()),
        "yaml" | "yml" => serde_yaml::from_str::<CrawlInput>(&contents).map_err(|e| e.to_string()),
        _ => serde_json::from_str::<CrawlInput>(&contents).map_err(|e| e.to_string()),
    };

    let input = parsed.map_err(|message| ConfigError::Parse {
        path: path.to_path_buf(),
        message,
    })?;
    info!("Loaded config from {}", path.display());
    Ok(input)
}
