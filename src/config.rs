//! Configuration loading from TOML with environment variable resolution.
//!
//! Reads `config.toml` and deserializes into strongly-typed structs.
//! The market-data API key is referenced by env-var name in the config
//! and resolved at runtime via `std::env::var`, so no credential is
//! ever embedded in the source or the config file.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;

/// Top-level application configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub provider: ProviderConfig,
    #[serde(default)]
    pub game: GameConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ProviderConfig {
    /// Query endpoint, e.g. "https://www.alphavantage.co/query".
    pub base_url: String,
    /// Name of the environment variable holding the API key.
    pub api_key_env: String,
    /// Whole-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Alpha Vantage `outputsize` parameter: "full" or "compact".
    #[serde(default = "default_output_size")]
    pub output_size: String,
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_output_size() -> String {
    "full".to_string()
}

/// Start-point selection policy.
#[derive(Debug, Deserialize, Clone)]
pub struct GameConfig {
    /// Closest a random start date may be to today, in calendar days.
    pub min_days_ago: i64,
    /// Furthest a random start date may be from today, in calendar days.
    pub max_days_ago: i64,
    /// Sampling attempts before giving up on landing on a weekday.
    pub weekday_attempts: u32,
    /// Minimum series index for a start point (prior days needed for the
    /// chart).
    pub min_start_index: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            min_days_ago: 7,
            max_days_ago: 100,
            weekday_attempts: 50,
            min_start_index: 7,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct UiConfig {
    /// How many trailing closes the chart shows.
    pub chart_window: usize,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self { chart_window: 7 }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {path}"))?;
        let config: AppConfig = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {path}"))?;
        Ok(config)
    }

    /// Resolve an environment variable name to its value.
    /// Useful for loading secrets referenced in the config.
    pub fn resolve_env(env_name: &str) -> Result<String> {
        std::env::var(env_name)
            .with_context(|| format!("Environment variable not set: {env_name}"))
    }
}
