//! Shared utilities for bucket-probe CLI binaries.
//!
//! Logging setup, the common `--log-level` argument and the number and
//! duration formatting used in run summaries.

pub mod args;
pub mod format;
pub mod logging;

pub use args::{LogLevel, parse_positive_usize};
pub use format::{format_duration, format_number};
pub use logging::init_logging;
