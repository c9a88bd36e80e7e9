//! Pagesift main entry point
//!
//! This is the command-line interface for the Pagesift page extractor.

use anyhow::Context;
use clap::Parser;
use pagesift::config::{
    load_config_with_hash, validate, Config, JobConfig, SelectorSet, CONTAINER_KEY, TITLE_FIELD,
};
use pagesift::fetch::backoff_delay;
use pagesift::job::{Interval, Job, JobRunner, Scheduler, ShutdownHandle};
use pagesift::logging::init_logging;
use pagesift::url::normalize_target_url;
use pagesift::ConfigError;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

/// Pagesift: selector-driven page extraction
///
/// Fetches a page, extracts one record per container element using CSS
/// selectors, and writes the records to output_<timestamp>.csv. Jobs can run
/// once or repeat on an interval until interrupted.
#[derive(Parser, Debug)]
#[command(name = "pagesift")]
#[command(version)]
#[command(about = "Selector-driven page extraction to CSV", long_about = None)]
struct Cli {
    /// Page to extract from (https:// is assumed when no scheme is given)
    #[arg(value_name = "URL")]
    url: Option<String>,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Container selector (scope for all other fields)
    #[arg(long, value_name = "SELECTOR")]
    container: Option<String>,

    /// Title selector
    #[arg(long, value_name = "SELECTOR")]
    title: Option<String>,

    /// Price selector
    #[arg(long, value_name = "SELECTOR")]
    price: Option<String>,

    /// Additional field, repeatable
    #[arg(long = "field", value_name = "NAME=SELECTOR", value_parser = parse_field)]
    fields: Vec<(String, String)>,

    /// Repeat the URL job every INTERVAL (e.g. 30m, 2h, 1d)
    #[arg(long, value_name = "INTERVAL", requires = "url")]
    every: Option<String>,

    /// Attempts per fetch, including the first
    #[arg(long, value_name = "N")]
    max_attempts: Option<u32>,

    /// Backoff base in milliseconds
    #[arg(long, value_name = "MS")]
    retry_delay_ms: Option<u64>,

    /// Maximum requests per second
    #[arg(long, value_name = "CALLS")]
    rate: Option<f64>,

    /// Directory for CSV output
    #[arg(long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Directory for the scraper_<timestamp>.log file
    #[arg(long, value_name = "DIR", default_value = ".")]
    log_dir: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate configuration and show the jobs without fetching anything
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let log_path = init_logging(cli.verbose, cli.quiet, &cli.log_dir)
        .with_context(|| format!("failed to create log file in {}", cli.log_dir.display()))?;
    tracing::info!("Logging to {}", log_path.display());

    let config = match build_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Invalid configuration: {}", e);
            return Err(e.into());
        }
    };

    if config.jobs.is_empty() {
        anyhow::bail!("nothing to do: pass a URL or a config file with [[job]] entries");
    }

    if cli.dry_run {
        print_dry_run(&config);
        return Ok(ExitCode::SUCCESS);
    }

    let runner = Arc::new(JobRunner::from_config(&config).context("failed to build fetcher")?);

    let shutdown = ShutdownHandle::new();
    tokio::spawn(stop_on_signal(shutdown.clone()));

    let (scheduled, once): (Vec<&JobConfig>, Vec<&JobConfig>) =
        config.jobs.iter().partition(|job| job.interval.is_some());

    let jobs: Vec<Job> = once.into_iter().map(Job::from).collect();
    let failures = run_one_shot_jobs(&runner, &jobs, &shutdown).await;

    if !scheduled.is_empty() && !shutdown.is_stopped() {
        let mut scheduler = Scheduler::with_shutdown(Arc::clone(&runner), shutdown);
        for job_config in scheduled {
            if let Some(interval) = &job_config.interval {
                scheduler.schedule(Job::from(job_config), interval)?;
                println!("Scraper scheduled to run {} every {}", job_config.url, interval);
            }
        }

        scheduler.run().await;
    }

    if failures > 0 {
        tracing::error!("{} job(s) produced no output", failures);
        Ok(ExitCode::FAILURE)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

/// Runs each job once, in order, returning how many produced no output
///
/// A shutdown request lets the current run finish and skips the rest.
async fn run_one_shot_jobs(runner: &JobRunner, jobs: &[Job], shutdown: &ShutdownHandle) -> usize {
    let mut failures = 0;

    for (index, job) in jobs.iter().enumerate() {
        if shutdown.is_stopped() {
            tracing::warn!("Shutdown requested, skipping {} remaining job(s)", jobs.len() - index);
            break;
        }

        tracing::info!("Starting one-time scrape of {}", job.url);
        if !runner.run_job(job).await.is_success() {
            failures += 1;
        }
    }

    failures
}

/// Loads the config file (if any), then layers command-line options on top
fn build_config(cli: &Cli) -> Result<Config, ConfigError> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => Config::default(),
    };

    if let Some(max_attempts) = cli.max_attempts {
        config.fetcher.max_attempts = max_attempts;
    }
    if let Some(retry_delay_ms) = cli.retry_delay_ms {
        config.fetcher.retry_delay_ms = retry_delay_ms;
    }
    if let Some(rate) = cli.rate {
        config.fetcher.calls_per_second = rate;
    }
    if let Some(output_dir) = &cli.output_dir {
        config.output.directory = output_dir.clone();
    }

    if let Some(url) = &cli.url {
        let mut job = JobConfig::new(url.clone(), cli_selectors(cli));
        job.interval = cli.every.clone();
        config.jobs.push(job);
    }

    validate(&config)?;
    Ok(config)
}

/// Selector set from the command line
///
/// Without any selector flags the default set applies. With any of them,
/// only the supplied keys are used; a missing container falls back to
/// `.item` at extraction time.
fn cli_selectors(cli: &Cli) -> SelectorSet {
    let custom = cli.container.is_some()
        || cli.title.is_some()
        || cli.price.is_some()
        || !cli.fields.is_empty();
    if !custom {
        return SelectorSet::default();
    }

    let mut selectors = SelectorSet::new();
    let named = [
        (CONTAINER_KEY, &cli.container),
        (TITLE_FIELD, &cli.title),
        ("price", &cli.price),
    ];
    for (key, value) in named {
        if let Some(selector) = value.as_deref().map(str::trim) {
            if !selector.is_empty() {
                selectors.insert(key, selector);
            }
        }
    }
    for (name, selector) in &cli.fields {
        selectors.insert(name.clone(), selector.clone());
    }

    selectors
}

/// Parses `NAME=SELECTOR`
fn parse_field(raw: &str) -> Result<(String, String), String> {
    let (name, selector) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=SELECTOR, got '{}'", raw))?;

    let name = name.trim();
    if name.is_empty() {
        return Err("field name cannot be empty".to_string());
    }
    if name == CONTAINER_KEY {
        return Err("use --container for the container selector".to_string());
    }

    Ok((name.to_string(), selector.trim().to_string()))
}

/// Handles the --dry-run mode: shows what would run
fn print_dry_run(config: &Config) {
    println!("=== Pagesift Dry Run ===\n");

    println!("Fetcher Configuration:");
    println!("  Max attempts: {}", config.fetcher.max_attempts);
    println!("  Retry delay: {}ms", config.fetcher.retry_delay_ms);
    let backoff: Vec<String> = (1..config.fetcher.max_attempts)
        .map(|attempt| format!("{:?}", backoff_delay(config.fetcher.retry_delay(), attempt)))
        .collect();
    if !backoff.is_empty() {
        println!("  Backoff between attempts: {}", backoff.join(", "));
    }
    println!("  Calls per second: {}", config.fetcher.calls_per_second);
    println!("  Timeout: {}s", config.fetcher.timeout_secs);
    println!("  User agent: {}", config.fetcher.user_agent);

    println!("\nOutput:");
    println!("  Directory: {}", config.output.directory.display());

    println!("\nJobs ({}):", config.jobs.len());
    for job in &config.jobs {
        let url = normalize_target_url(&job.url)
            .map(|url| url.to_string())
            .unwrap_or_else(|_| job.url.clone());
        let schedule = job
            .interval
            .as_deref()
            .and_then(|raw| raw.parse::<Interval>().ok())
            .map(|interval| format!("every {}", interval))
            .unwrap_or_else(|| "once".to_string());

        println!("  - {} ({})", url, schedule);
        println!("    container: {}", job.selectors.container());
        for (field, selector) in job.selectors.fields() {
            println!("    {}: {}", field, selector);
        }
    }

    println!("\n✓ Configuration is valid");
}

/// Stops the scheduler on SIGINT or SIGTERM
async fn stop_on_signal(handle: ShutdownHandle) {
    wait_for_signal().await;
    tracing::info!("Received shutdown signal. Stopping scheduler...");
    handle.stop();
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    match signal(SignalKind::terminate()) {
        Ok(mut terminate) => {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {}
                _ = terminate.recv() => {}
            }
        }
        Err(e) => {
            tracing::warn!("Cannot listen for SIGTERM: {}", e);
            let _ = tokio::signal::ctrl_c().await;
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
