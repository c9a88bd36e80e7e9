//! Configuration module for Pagesift
//!
//! This module handles loading, parsing, and validating TOML configuration
//! files, and defines the selector sets that drive extraction.
//!
//! # Example
//!
//! ```no_run
//! use pagesift::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("pagesift.toml")).unwrap();
//! println!("Fetcher will try {} times", config.fetcher.max_attempts);
//! ```

mod parser;
mod selectors;
mod types;
mod validation;

// Re-export types
pub use selectors::{SelectorSet, CONTAINER_KEY, DEFAULT_CONTAINER, TITLE_FIELD};
pub use types::{Config, FetcherConfig, JobConfig, OutputConfig, DEFAULT_USER_AGENT};

// Re-export parser and validation functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
pub use validation::{validate, validate_selectors};
