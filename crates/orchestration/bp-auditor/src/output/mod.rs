//! Result sinks for audit reports.
//!
//! Implementations of [`ResultSink`](bp_traits::ResultSink):
//! - [`FileSink`] - Appends vulnerable paths to newline-delimited result files
//! - [`StdoutSink`] - Prints each root report as JSON or JSONL

mod file;
mod stdout;

pub use file::{
    AMBIGUOUS_FILE_PREFIX, DELETE_VULNERABLE_FILE_PREFIX, FileSink, RUN_STAMP_FORMAT,
    WRITE_VULNERABLE_FILE_PREFIX,
};
pub use stdout::{OutputFormat, StdoutSink};
