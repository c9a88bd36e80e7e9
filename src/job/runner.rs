//! One fetch, extract and write cycle
//!
//! [`JobRunner::run_once`] is the body of both manual runs and scheduled
//! runs. Each call writes at most one uniquely named file and shares nothing
//! with concurrent calls except the fetcher (its rate limiter and HTTP client).

use crate::config::{Config, JobConfig, SelectorSet};
use crate::extract::Extractor;
use crate::fetch::{FetchResult, Fetcher};
use crate::job::naming::{claim_output_path, stamp_now};
use crate::output::{CsvWriter, OutputResult, RecordWriter};
use crate::url::normalize_target_url;

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::Instrument;

/// Characters of the fetched body shown in debug logs
const PREVIEW_CHARS: usize = 500;

/// A page to extract from and the selectors to apply
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub url: String,
    pub selectors: SelectorSet,
}

impl Job {
    pub fn new(url: impl Into<String>, selectors: SelectorSet) -> Self {
        Self {
            url: url.into(),
            selectors,
        }
    }
}

impl From<&JobConfig> for Job {
    fn from(config: &JobConfig) -> Self {
        Job::new(config.url.clone(), config.selectors.clone())
    }
}

/// How a single run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Records were extracted and written
    Written { path: PathBuf, records: usize },
    /// The target URL could not be understood
    InvalidUrl { reason: String },
    /// Every fetch attempt failed
    FetchFailed { attempts: u32 },
    /// The page was fetched but no container yielded data
    NoRecords,
    /// Records were extracted but could not be written to `directory`
    WriteFailed { directory: PathBuf },
}

impl RunOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, RunOutcome::Written { .. })
    }
}

/// Composes fetcher, extractor and writer
pub struct JobRunner {
    fetcher: Fetcher,
    extractor: Extractor,
    writer: Arc<dyn RecordWriter>,
    output_dir: PathBuf,
    runs: AtomicU64,
}

impl JobRunner {
    pub fn new(
        fetcher: Fetcher,
        writer: Arc<dyn RecordWriter>,
        output_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            fetcher,
            extractor: Extractor::new(),
            writer,
            output_dir: output_dir.into(),
            runs: AtomicU64::new(0),
        }
    }

    /// Builds a runner writing CSV files as configured
    pub fn from_config(config: &Config) -> crate::Result<Self> {
        let fetcher = Fetcher::from_config(&config.fetcher)?;
        Ok(Self::new(
            fetcher,
            Arc::new(CsvWriter::new()),
            config.output.directory.clone(),
        ))
    }

    /// Runs a [`Job`]
    pub async fn run_job(&self, job: &Job) -> RunOutcome {
        self.run_once(&job.url, &job.selectors).await
    }

    /// Fetches `url`, extracts records and writes `output_<timestamp>.csv`
    ///
    /// Never fails: every problem is logged and reported through the
    /// returned [`RunOutcome`], so callers such as the scheduler can keep
    /// going.
    pub async fn run_once(&self, url: &str, selectors: &SelectorSet) -> RunOutcome {
        let run_id = self.runs.fetch_add(1, Ordering::Relaxed) + 1;
        let span = tracing::info_span!("run", id = run_id, url = %url);

        let outcome = self.run_inner(url, selectors).instrument(span.clone()).await;

        span.in_scope(|| match &outcome {
            RunOutcome::Written { path, records } => {
                tracing::info!("Run finished: {} records in {}", records, path.display())
            }
            other => tracing::warn!("Run finished without output: {:?}", other),
        });

        outcome
    }

    async fn run_inner(&self, url: &str, selectors: &SelectorSet) -> RunOutcome {
        let target = match normalize_target_url(url) {
            Ok(target) => target,
            Err(e) => {
                tracing::error!("Invalid target URL '{}': {}", url, e);
                return RunOutcome::InvalidUrl {
                    reason: e.to_string(),
                };
            }
        };

        tracing::info!("Starting scrape of {}", target);
        tracing::debug!("Using selectors: {}", selectors);

        let body = match self.fetcher.fetch(target.as_str()).await {
            FetchResult::Success {
                final_url, body, ..
            } => {
                if final_url != target.as_str() {
                    tracing::info!("Redirected to {}", final_url);
                }
                body
            }
            FetchResult::Exhausted { attempts, .. } => {
                tracing::error!("Failed to fetch the page");
                return RunOutcome::FetchFailed { attempts };
            }
        };

        tracing::debug!("Received HTML content (preview): {}", preview(&body));

        let records = self.extractor.extract(Some(&body), selectors);
        if records.is_empty() {
            tracing::error!("No data extracted from the page");
            return RunOutcome::NoRecords;
        }

        let count = records.len();
        let stamp = stamp_now();
        let writer = Arc::clone(&self.writer);
        let directory = self.output_dir.clone();

        // The output name is claimed only once the staged file is complete,
        // so an interrupted write never leaves an empty or partial output_*.csv.
        let written = tokio::task::spawn_blocking(move || -> OutputResult<PathBuf> {
            std::fs::create_dir_all(&directory)?;
            let staged = writer.stage(&records, &directory)?;
            Ok(claim_output_path(staged, &directory, &stamp)?)
        })
        .await;

        match written {
            Ok(Ok(path)) => {
                tracing::info!("Successfully wrote {} items to {}", count, path.display());
                RunOutcome::Written {
                    path,
                    records: count,
                }
            }
            Ok(Err(e)) => {
                tracing::error!(
                    "Error saving to {}: {}",
                    self.output_dir.display(),
                    e
                );
                RunOutcome::WriteFailed {
                    directory: self.output_dir.clone(),
                }
            }
            Err(e) => {
                tracing::error!("Writer task failed: {}", e);
                RunOutcome::WriteFailed {
                    directory: self.output_dir.clone(),
                }
            }
        }
    }
}

/// First [`PREVIEW_CHARS`] characters of a body, with an ellipsis if cut
fn preview(body: &str) -> String {
    match body.char_indices().nth(PREVIEW_CHARS) {
        Some((cut, _)) => format!("{}...", &body[..cut]),
        None => body.to_string(),
    }
}
