//! Pagesift: selector-driven page extraction
//!
//! This crate fetches web pages with bounded retries and rate limiting,
//! extracts structured records through configurable CSS selectors, and
//! writes them as CSV files, either once or on a recurring schedule.

pub mod config;
pub mod extract;
pub mod fetch;
pub mod job;
pub mod logging;
pub mod output;
pub mod url;

use thiserror::Error;

/// Main error type for Pagesift operations
#[derive(Debug, Error)]
pub enum PagesiftError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid selector '{selector}' for field '{field}': {message}")]
    InvalidSelector {
        field: String,
        selector: String,
        message: String,
    },

    #[error("Invalid interval '{0}': use <N>h for hours, <N>m for minutes or <N>d for days")]
    InvalidInterval(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing domain in URL")]
    MissingDomain,
}

/// Result type alias for Pagesift operations
pub type Result<T> = std::result::Result<T, PagesiftError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::{Config, SelectorSet};
pub use extract::{Extractor, Record};
pub use fetch::{FetchResult, Fetcher, RateLimiter};
pub use job::{Interval, JobRunner, RunOutcome, Scheduler};
pub use output::{CsvWriter, RecordWriter};
pub use crate::url::normalize_target_url;
