//! Output module for persisting extracted records
//!
//! This module handles:
//! - The [`RecordWriter`] contract (contained failures, no file for no data)
//! - CSV output with atomic replacement of the target file

mod csv_writer;
mod traits;

pub use csv_writer::CsvWriter;
pub use traits::{OutputError, OutputResult, RecordWriter};
