//! Logging setup: timestamped events to the console and to a log file

use crate::job::stamp_now;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// `scraper_<stamp>.log`
pub fn log_file_name(stamp: &str) -> String {
    format!("scraper_{}.log", stamp)
}

/// Maps verbosity flags to a filter
pub fn build_filter(verbose: u8, quiet: bool) -> EnvFilter {
    if quiet {
        return EnvFilter::new("error");
    }

    match verbose {
        0 => EnvFilter::new("pagesift=info,warn"),
        1 => EnvFilter::new("pagesift=debug,info"),
        2 => EnvFilter::new("pagesift=trace,debug"),
        _ => EnvFilter::new("trace"),
    }
}

/// Installs the global subscriber
///
/// Events go to stderr and, without ANSI colors, to a fresh log file in
/// `log_dir`. Returns the log file path.
///
/// # Panics
///
/// Panics if a global subscriber is already installed.
pub fn init_logging(verbose: u8, quiet: bool, log_dir: &Path) -> std::io::Result<PathBuf> {
    std::fs::create_dir_all(log_dir)?;
    let path = log_dir.join(log_file_name(&stamp_now()));
    let file = File::create(&path)?;

    let console_layer = fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    let file_layer = fmt::layer()
        .with_target(false)
        .with_ansi(false)
        .with_writer(Mutex::new(file));

    tracing_subscriber::registry()
        .with(build_filter(verbose, quiet))
        .with(console_layer)
        .with(file_layer)
        .init();

    Ok(path)
}
