//! CSV output
//!
//! Files are written to a temporary sibling first and renamed into place, so
//! a failed or interrupted write never leaves a truncated file at the target.

use crate::extract::Record;
use crate::output::traits::{OutputError, OutputResult, RecordWriter};
use std::path::Path;
use tempfile::NamedTempFile;

/// Writes records as a comma-separated file with a header row
///
/// Columns follow the field order of the first record. Later records missing
/// a column get an empty cell; fields absent from the header are ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvWriter;

impl CsvWriter {
    pub fn new() -> Self {
        Self
    }
}

/// Mode of finished output files, matching a plain create under a 022 umask
#[cfg(unix)]
const OUTPUT_MODE: u32 = 0o644;

impl RecordWriter for CsvWriter {
    fn stage(&self, records: &[Record], directory: &Path) -> OutputResult<NamedTempFile> {
        let first = records.first().ok_or(OutputError::NoRecords)?;
        let columns: Vec<&str> = first.field_names().collect();

        let mut staging = tempfile::Builder::new()
            .prefix(".pagesift-")
            .suffix(".csv.tmp")
            .tempfile_in(directory)?;

        {
            let mut writer = csv::Writer::from_writer(staging.as_file_mut());
            writer.write_record(&columns)?;

            for (index, record) in records.iter().enumerate() {
                let extra: Vec<&str> = record
                    .field_names()
                    .filter(|name| !columns.contains(name))
                    .collect();
                if !extra.is_empty() {
                    tracing::debug!(
                        "Record {}: ignoring fields not in header: {:?}",
                        index + 1,
                        extra
                    );
                }

                writer.write_record(
                    columns
                        .iter()
                        .map(|column| record.get(column).unwrap_or_default()),
                )?;
            }

            writer.flush()?;
        }

        // Staging files are created owner-only.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            staging
                .as_file()
                .set_permissions(std::fs::Permissions::from_mode(OUTPUT_MODE))?;
        }

        staging.as_file().sync_all()?;

        Ok(staging)
    }
}
