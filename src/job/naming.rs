//! Timestamped file naming for run outputs and logs

use std::io;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// chrono format used in output and log file names
pub const STAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Suffixes tried before giving up on a free output name
const MAX_NAME_ATTEMPTS: u32 = 1000;

/// Current local time formatted with [`STAMP_FORMAT`]
pub fn stamp_now() -> String {
    chrono::Local::now().format(STAMP_FORMAT).to_string()
}

/// `output_<stamp>.csv`, or `output_<stamp>_<n>.csv` for `n > 1`
pub fn output_file_name(stamp: &str, n: u32) -> String {
    if n <= 1 {
        format!("output_{}.csv", stamp)
    } else {
        format!("output_{}_{}.csv", stamp, n)
    }
}

/// Moves a fully written staging file to a free output name in `directory`
///
/// Names are claimed with no-clobber semantics, so two runs stamped in the
/// same second receive different names and nothing at an `output_*` path is
/// ever incomplete. On error the staging file is dropped and removed.
pub fn claim_output_path(
    mut staged: NamedTempFile,
    directory: &Path,
    stamp: &str,
) -> io::Result<PathBuf> {
    for n in 1..=MAX_NAME_ATTEMPTS {
        let path = directory.join(output_file_name(stamp, n));
        match staged.persist_noclobber(&path) {
            Ok(_) => return Ok(path),
            Err(e) if e.error.kind() == io::ErrorKind::AlreadyExists => staged = e.file,
            Err(e) => return Err(e.error),
        }
    }

    Err(io::Error::new(
        io::ErrorKind::AlreadyExists,
        format!("no free output name for stamp {}", stamp),
    ))
}
