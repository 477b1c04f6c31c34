use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

const DEFAULT_BASE_URL: &str = "https://www.toolify.ai/";
const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Run configuration. Defaults are overridden by an optional `toolify.toml`
/// next to the binary, then by `TOOLIFY_*` environment variables
/// (e.g. `TOOLIFY_HEADLESS=false`).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub base_url: String,
    pub output_dir: PathBuf,
    pub headless: bool,
    pub user_agent: String,
    pub page_load_timeout_secs: u64,
    pub load_step_pause_secs: u64,
    pub max_retries: u32,
    pub retry_delay_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            output_dir: PathBuf::from("data"),
            headless: true,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            page_load_timeout_secs: 30,
            load_step_pause_secs: 2,
            max_retries: 3,
            retry_delay_secs: 5,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name("toolify").required(false))
            .add_source(config::Environment::with_prefix("TOOLIFY"))
            .build()
            .context("Failed to assemble configuration sources")?;
        settings
            .try_deserialize()
            .context("Invalid configuration value")
    }

    pub fn page_load_timeout(&self) -> Duration {
        Duration::from_secs(self.page_load_timeout_secs)
    }

    pub fn load_step_pause(&self) -> Duration {
        Duration::from_secs(self.load_step_pause_secs)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry_delay_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_target_site() {
        let cfg = Config::default();
        assert_eq!(cfg.base_url, "https://www.toolify.ai/");
        assert!(cfg.headless);
        assert_eq!(cfg.max_retries, 3);
        assert_eq!(cfg.load_step_pause(), Duration::from_secs(2));
    }
}
