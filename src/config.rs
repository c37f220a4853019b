use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{AppError, Result};

/// Environment variable that overrides the default config location.
pub const CONFIG_ENV: &str = "SUBREDDIT_SCRAPER_CONFIG";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub reddit: RedditConfig,
    pub database: DatabaseConfig,
    pub twilio: TwilioConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RedditConfig {
    pub client_id: String,
    pub client_secret: String,
    pub user_agent: String,
    pub target_subreddit: String,

    /// Submissions younger than this many seconds are left for a later run.
    pub min_submission_age: u64,

    /// How many of the newest submissions are inspected per run.
    #[serde(default = "default_listing_limit")]
    pub listing_limit: usize,

    #[serde(default = "default_throttle_ms")]
    pub throttle_ms: u64,

    #[serde(default = "default_reddit_auth_url")]
    pub auth_url: String,

    #[serde(default = "default_reddit_api_url")]
    pub api_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub path: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TwilioConfig {
    pub account_sid: String,
    pub auth_token: String,
    pub from_num: String,
    pub to_num: String,

    #[serde(default = "default_twilio_api_url")]
    pub api_url: String,
}

fn default_listing_limit() -> usize {
    1000
}

fn default_throttle_ms() -> u64 {
    1000
}

fn default_reddit_auth_url() -> String {
    "https://www.reddit.com".to_string()
}

fn default_reddit_api_url() -> String {
    "https://oauth.reddit.com".to_string()
}

fn default_twilio_api_url() -> String {
    "https://api.twilio.com".to_string()
}

impl RedditConfig {
    pub fn throttle(&self) -> Duration {
        Duration::from_millis(self.throttle_ms)
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            return Err(AppError::Config(format!(
                "config file not found at {}",
                config_path.display()
            )));
        }

        tracing::debug!("Loading config from {}", config_path.display());
        let content = std::fs::read_to_string(config_path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects blank values for keys that have no sensible default.
    fn validate(&self) -> Result<()> {
        let required = [
            ("reddit.client_id", &self.reddit.client_id),
            ("reddit.client_secret", &self.reddit.client_secret),
            ("reddit.user_agent", &self.reddit.user_agent),
            ("reddit.target_subreddit", &self.reddit.target_subreddit),
            ("database.path", &self.database.path),
            ("twilio.account_sid", &self.twilio.account_sid),
            ("twilio.auth_token", &self.twilio.auth_token),
            ("twilio.from_num", &self.twilio.from_num),
            ("twilio.to_num", &self.twilio.to_num),
        ];

        if let Some((key, _)) = required.iter().find(|(_, value)| value.trim().is_empty()) {
            return Err(AppError::MissingKey(key.to_string()));
        }

        if self.reddit.listing_limit == 0 {
            return Err(AppError::Config(
                "reddit.listing_limit must be at least 1".to_string(),
            ));
        }

        Ok(())
    }

    pub fn config_path() -> PathBuf {
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            return PathBuf::from(path);
        }
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("subreddit-scraper")
            .join("config.toml")
    }
}
