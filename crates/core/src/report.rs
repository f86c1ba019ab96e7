//! JSON report files.

use std::path::Path;

use serde::Serialize;
use thiserror::Error;

/// Errors writing a report.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Serialization failed.
    #[error("Cannot serialize report: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The file could not be written.
    #[error("Cannot write {path}: {source}")]
    Io {
        /// Target path.
        path: String,
        /// Underlying error.
        source: std::io::Error,
    },
}

/// Writes `value` as pretty-printed JSON, replacing any existing file.
///
/// # Errors
///
/// Returns an error if serialization or the write fails.
pub fn write_json_report<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), ReportError> {
    let json = serde_json::to_string_pretty(value)?;
    std::fs::write(path, json).map_err(|source| ReportError::Io {
        path: path.display().to_string(),
        source,
    })
}
