//! Record writer trait and error types

use crate::extract::Record;
use std::path::Path;
use tempfile::NamedTempFile;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("No records to write")]
    NoRecords,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Failed to move output into place: {0}")]
    Persist(#[from] tempfile::PersistError),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Trait for record writers
///
/// Writers render a batch of records into a staging file, which is then moved
/// into place in one step. Implementations must be thread-safe; a scheduled
/// run and a manual run may write concurrently (to different paths).
pub trait RecordWriter: Send + Sync {
    /// Renders all records into a synced staging file inside `directory`
    ///
    /// An empty batch is an error and must not create a file. Dropping the
    /// returned file removes it.
    fn stage(&self, records: &[Record], directory: &Path) -> OutputResult<NamedTempFile>;

    /// Writes all records to `path`, returning the number of rows written
    ///
    /// An existing file at `path` is replaced atomically.
    fn try_write(&self, records: &[Record], path: &Path) -> OutputResult<usize> {
        let directory = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let staged = self.stage(records, directory)?;
        staged.persist(path)?;

        Ok(records.len())
    }

    /// Writes all records to `path`, logging any failure
    ///
    /// # Returns
    ///
    /// * `true` - The file was written
    /// * `false` - Nothing to write, or the write failed
    fn write(&self, records: &[Record], path: &Path) -> bool {
        match self.try_write(records, path) {
            Ok(rows) => {
                tracing::info!("Successfully wrote {} items to {}", rows, path.display());
                true
            }
            Err(OutputError::NoRecords) => {
                tracing::warn!("No data to save");
                false
            }
            Err(e) => {
                tracing::error!("Error saving to {}: {}", path.display(), e);
                false
            }
        }
    }
}
