//! Job module: running the pipeline once or on a schedule
//!
//! This module contains:
//! - [`JobRunner`], which composes fetch, extract and write for one run
//! - Output file naming with per-run timestamps
//! - [`Interval`] parsing for `<N><h|m|d>` schedules
//! - [`Scheduler`] and its [`ShutdownHandle`]

mod interval;
mod naming;
mod runner;
mod scheduler;

pub use interval::{Interval, IntervalUnit};
pub use naming::{output_file_name, claim_output_path, stamp_now, STAMP_FORMAT};
pub use runner::{Job, JobRunner, RunOutcome};
pub use scheduler::{Scheduler, ShutdownHandle};
