use crate::config::selectors::SelectorSet;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Identifying client header sent with every request
pub const DEFAULT_USER_AGENT: &str = concat!(
    "Mozilla/5.0 (compatible; pagesift/",
    env!("CARGO_PKG_VERSION"),
    ")"
);

/// Main configuration structure for Pagesift
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub fetcher: FetcherConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default, rename = "job")]
    pub jobs: Vec<JobConfig>,
}

/// Fetch behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct FetcherConfig {
    /// Total attempts per fetch, including the first
    #[serde(rename = "max-attempts", default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Backoff base; attempt `n` failing sleeps `n * retry_delay_ms`
    #[serde(rename = "retry-delay-ms", default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,

    /// Maximum request rate across all jobs sharing one fetcher
    #[serde(rename = "calls-per-second", default = "default_calls_per_second")]
    pub calls_per_second: f64,

    /// Per-request timeout (seconds)
    #[serde(rename = "timeout-secs", default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,
}

impl FetcherConfig {
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            retry_delay_ms: default_retry_delay_ms(),
            calls_per_second: default_calls_per_second(),
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Directory receiving `output_<timestamp>.csv` files
    #[serde(default = "default_output_directory")]
    pub directory: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_directory(),
        }
    }
}

/// One extraction job
#[derive(Debug, Clone, Deserialize)]
pub struct JobConfig {
    /// Target page; the scheme defaults to https
    pub url: String,

    #[serde(default)]
    pub selectors: SelectorSet,

    /// Repeat interval such as `30m`; absent means run once
    #[serde(default)]
    pub interval: Option<String>,
}

impl JobConfig {
    pub fn new(url: impl Into<String>, selectors: SelectorSet) -> Self {
        Self {
            url: url.into(),
            selectors,
            interval: None,
        }
    }
}

fn default_max_attempts() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    1000
}

fn default_calls_per_second() -> f64 {
    1.0
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_output_directory() -> PathBuf {
    PathBuf::from(".")
}
