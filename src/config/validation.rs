use crate::config::selectors::{SelectorSet, CONTAINER_KEY};
use crate::config::types::{Config, FetcherConfig, JobConfig, OutputConfig};
use crate::job::Interval;
use crate::url::normalize_target_url;
use crate::ConfigError;
use scraper::Selector;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_fetcher_config(&config.fetcher)?;
    validate_output_config(&config.output)?;
    for job in &config.jobs {
        validate_job(job)?;
    }
    Ok(())
}

/// Validates fetcher configuration
fn validate_fetcher_config(config: &FetcherConfig) -> Result<(), ConfigError> {
    if config.max_attempts < 1 {
        return Err(ConfigError::Validation(format!(
            "max-attempts must be >= 1, got {}",
            config.max_attempts
        )));
    }

    if !config.calls_per_second.is_finite() || config.calls_per_second <= 0.0 {
        return Err(ConfigError::Validation(format!(
            "calls-per-second must be a positive number, got {}",
            config.calls_per_second
        )));
    }

    if config.timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "timeout-secs must be >= 1".to_string(),
        ));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.directory.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "output directory cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates a single job: URL, selectors and optional interval
fn validate_job(job: &JobConfig) -> Result<(), ConfigError> {
    normalize_target_url(&job.url)
        .map_err(|e| ConfigError::InvalidUrl(format!("'{}': {}", job.url, e)))?;

    validate_selectors(&job.selectors)?;

    if let Some(interval) = &job.interval {
        interval.parse::<Interval>()?;
    }

    Ok(())
}

/// Checks that the container and every non-blank field selector compile
pub fn validate_selectors(selectors: &SelectorSet) -> Result<(), ConfigError> {
    let container = selectors.container();
    check_selector(CONTAINER_KEY, container)?;

    for (field, selector) in selectors.fields() {
        check_selector(field, selector)?;
    }

    Ok(())
}

fn check_selector(field: &str, selector: &str) -> Result<(), ConfigError> {
    Selector::parse(selector)
        .map(|_| ())
        .map_err(|e| ConfigError::InvalidSelector {
            field: field.to_string(),
            selector: selector.to_string(),
            message: e.to_string(),
        })
}
