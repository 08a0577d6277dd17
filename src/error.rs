use chrono::NaiveDate;
use thiserror::Error;

use std::path::PathBuf;

/// Result type for every fallible operation in this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can stop a run.
///
/// None of these are recoverable: the command-line tool prints the message
/// and exits with a non-zero status.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Please provide the path to the CSV file. Exiting...")]
    Usage,

    #[error("The path {0:?} does not point to a file. Exiting...")]
    NotFound(PathBuf),

    #[error("{path:?} is missing required column(s): {}", .missing.join(", "))]
    Schema { path: PathBuf, missing: Vec<String> },

    #[error("{path:?}: {what} is too large to compute")]
    Overflow { path: PathBuf, what: String },

    #[error("run date {0} can't be recorded in a workbook")]
    RunDate(NaiveDate),

    #[error("reading {path:?}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("{path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("writing {path:?}: {source}")]
    Xlsx {
        path: PathBuf,
        #[source]
        source: rust_xlsxwriter::XlsxError,
    },
}
