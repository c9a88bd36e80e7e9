//! Periodic job scheduling
//!
//! This module handles:
//! - Registering jobs with a repeat interval (validated before registration)
//! - Driving one ticker task per job until shutdown is requested
//! - Letting a run that is in flight at shutdown finish its write

use crate::job::interval::Interval;
use crate::job::runner::{Job, JobRunner};
use crate::ConfigError;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinSet;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

/// Requests a [`Scheduler`] to stop
///
/// Cheap to clone; typically one clone is moved into a signal handler task.
#[derive(Debug, Clone)]
pub struct ShutdownHandle {
    tx: Arc<watch::Sender<bool>>,
}

impl ShutdownHandle {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// Stops accepting new triggers; runs in flight are allowed to finish
    pub fn stop(&self) {
        if !self.tx.send_replace(true) {
            tracing::info!("Shutdown requested, stopping scheduler");
        }
    }

    pub fn is_stopped(&self) -> bool {
        *self.tx.borrow()
    }

    fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }
}

impl Default for ShutdownHandle {
    fn default() -> Self {
        Self::new()
    }
}

/// A job registered with its period
#[derive(Debug, Clone)]
struct ScheduledJob {
    job: Job,
    period: Duration,
}

/// Runs registered jobs periodically until stopped
pub struct Scheduler {
    runner: Arc<JobRunner>,
    jobs: Vec<ScheduledJob>,
    shutdown: ShutdownHandle,
}

impl Scheduler {
    pub fn new(runner: Arc<JobRunner>) -> Self {
        Self::with_shutdown(runner, ShutdownHandle::new())
    }

    /// Creates a scheduler stopped through an existing handle
    ///
    /// A handle that is already stopped makes [`Scheduler::run`] return
    /// without running anything.
    pub fn with_shutdown(runner: Arc<JobRunner>, shutdown: ShutdownHandle) -> Self {
        Self {
            runner,
            jobs: Vec::new(),
            shutdown,
        }
    }

    /// Handle for stopping this scheduler from elsewhere
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        self.shutdown.clone()
    }

    /// Registers a job to run every `interval` (e.g. `"30m"`)
    ///
    /// The interval is parsed before anything is registered; a malformed
    /// interval leaves the scheduler unchanged.
    pub fn schedule(&mut self, job: Job, interval: &str) -> Result<(), ConfigError> {
        let interval: Interval = interval.parse()?;
        tracing::info!("Scheduled {} every {}", job.url, interval);
        self.schedule_every(job, interval.period());
        Ok(())
    }

    /// Registers a job with an explicit period
    pub fn schedule_every(&mut self, job: Job, period: Duration) {
        self.jobs.push(ScheduledJob { job, period });
    }

    /// Number of registered jobs
    pub fn job_count(&self) -> usize {
        self.jobs.len()
    }

    /// Drives all registered jobs until shutdown is requested
    ///
    /// Each job first runs one period after this call. Ticks missed while a
    /// run is still going are skipped rather than queued. Returns the total
    /// number of runs performed.
    pub async fn run(self) -> usize {
        let Scheduler {
            runner,
            jobs,
            shutdown,
        } = self;

        if jobs.is_empty() {
            tracing::warn!("No jobs scheduled, nothing to run");
            return 0;
        }

        tracing::info!("Scheduler started with {} jobs", jobs.len());

        let stop_rx = shutdown.subscribe();
        let mut tasks = JoinSet::new();
        for scheduled in jobs {
            tasks.spawn(run_periodically(
                Arc::clone(&runner),
                scheduled,
                stop_rx.clone(),
            ));
        }

        let mut total_runs = 0;
        while let Some(result) = tasks.join_next().await {
            match result {
                Ok(runs) => total_runs += runs,
                Err(e) => tracing::error!("Scheduled job task failed: {}", e),
            }
        }

        // Keep the sender alive until every ticker has observed shutdown.
        drop(shutdown);

        tracing::info!("Scheduler stopped after {} runs", total_runs);
        total_runs
    }
}

/// Ticker loop for one job
async fn run_periodically(
    runner: Arc<JobRunner>,
    scheduled: ScheduledJob,
    mut stop_rx: watch::Receiver<bool>,
) -> usize {
    let mut ticker = interval_at(Instant::now() + scheduled.period, scheduled.period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let mut runs = 0;

    loop {
        if *stop_rx.borrow() {
            break;
        }

        tokio::select! {
            biased;

            changed = stop_rx.changed() => {
                if changed.is_err() {
                    break;
                }
            }

            _ = ticker.tick() => {
                tracing::info!("Running scheduled scrape for {}", scheduled.job.url);

                // Run in its own task so a panic is contained to this run.
                let runner = Arc::clone(&runner);
                let job = scheduled.job.clone();
                match tokio::spawn(async move { runner.run_job(&job).await }).await {
                    Ok(_) => {}
                    Err(e) => tracing::error!(
                        "Scheduled run for {} panicked: {}",
                        scheduled.job.url,
                        e
                    ),
                }
                runs += 1;
            }
        }
    }

    runs
}
