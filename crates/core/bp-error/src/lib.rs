//! Error types and classification for bucket-probe.
//!
//! This crate provides:
//! - [`BpError`] - Top-level error enum for the audit pipeline
//! - Domain-specific errors ([`GatewayError`], [`InputError`], [`OutputError`])
//! - [`ErrorCategory`] for retry decision making

use thiserror::Error;

/// Top-level error type for bucket-probe.
#[derive(Error, Debug)]
pub enum BpError {
    /// Storage gateway errors (transport, timeout, throttling)
    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),

    /// Input errors (malformed roots list, missing probe file)
    #[error("Input error: {0}")]
    Input(#[from] InputError),

    /// Result sink errors
    #[error("Output error: {0}")]
    Output(#[from] OutputError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic errors (wrapped anyhow)
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Transport-level failures talking to the storage backend.
///
/// Service-level refusals (access denied, missing bucket) are not errors at
/// this level: gateways report them as faults inside a successful response so
/// the classifier can interpret them.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// The call did not complete within the configured timeout
    #[error("Timed out after {timeout_secs}s: {operation}")]
    Timeout { operation: String, timeout_secs: u64 },

    /// Request could not be dispatched or the response could not be read
    #[error("Transport failure: {0}")]
    Transport(String),

    /// Backend asked us to slow down
    #[error("Throttled: {0}")]
    Throttled(String),

    /// Backend returned a server-side (5xx) error
    #[error("Service unavailable: {0}")]
    Unavailable(String),

    /// Path could not be mapped onto the backend
    #[error("Invalid path: {0}")]
    InvalidPath(String),
}

/// Errors in operator-provided input.
#[derive(Error, Debug)]
pub enum InputError {
    /// A roots list entry is malformed
    #[error("Malformed input at line {line}: '{entry}': {reason}")]
    Malformed {
        line: usize,
        entry: String,
        reason: String,
    },

    /// A path could not be parsed
    #[error("Invalid path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    /// The roots list contains no usable entries
    #[error("No roots found in {0}")]
    Empty(String),

    /// The local probe object is missing or unreadable
    #[error("Probe file unavailable: {0}")]
    ProbeFile(String),

    /// I/O error while reading input
    #[error("I/O error: {0}")]
    Io(String),
}

/// Errors writing audit results.
#[derive(Error, Debug)]
pub enum OutputError {
    /// I/O error writing a result file
    #[error("I/O error: {0}")]
    Io(String),

    /// Report serialization failed
    #[error("Serialization failed: {0}")]
    Serialize(String),
}

/// Error classification for retry decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Transient error - retry with exponential backoff
    ///
    /// Examples: call timeout, connection reset, SlowDown, 503
    Transient,

    /// Permanent error - never retry
    ///
    /// Examples: malformed input, invalid path, write failure
    Permanent,
}

/// Classifies an error to determine retry behavior.
pub fn classify_error(error: &BpError) -> ErrorCategory {
    match error {
        BpError::Gateway(e) => classify_gateway_error(e),
        BpError::Input(_) => ErrorCategory::Permanent,
        BpError::Output(_) => ErrorCategory::Permanent,
        BpError::Config(_) => ErrorCategory::Permanent,
        BpError::Other(e) => classify_anyhow_error(e),
    }
}

/// Classifies a gateway error for retry purposes.
pub fn classify_gateway_error(error: &GatewayError) -> ErrorCategory {
    match error {
        GatewayError::Timeout { .. } => ErrorCategory::Transient,
        GatewayError::Transport(_) => ErrorCategory::Transient,
        GatewayError::Throttled(_) => ErrorCategory::Transient,
        GatewayError::Unavailable(_) => ErrorCategory::Transient,
        GatewayError::InvalidPath(_) => ErrorCategory::Permanent,
    }
}

fn classify_anyhow_error(error: &anyhow::Error) -> ErrorCategory {
    let err_string = error.to_string().to_lowercase();

    if err_string.contains("timeout")
        || err_string.contains("connection reset")
        || err_string.contains("slowdown")
        || err_string.contains("503")
    {
        ErrorCategory::Transient
    } else {
        ErrorCategory::Permanent
    }
}

/// Result type alias using BpError.
pub type Result<T> = std::result::Result<T, BpError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gateway_timeout_is_transient() {
        let error = BpError::Gateway(GatewayError::Timeout {
            operation: "list gs://bucket/".to_string(),
            timeout_secs: 30,
        });
        assert_eq!(classify_error(&error), ErrorCategory::Transient);
    }

    #[test]
    fn test_invalid_path_is_permanent() {
        let error = BpError::Gateway(GatewayError::InvalidPath("no bucket".to_string()));
        assert_eq!(classify_error(&error), ErrorCategory::Permanent);
    }

    #[test]
    fn test_input_errors_are_permanent() {
        let error = BpError::Input(InputError::Malformed {
            line: 3,
            entry: "bucket/".to_string(),
            reason: "missing scheme".to_string(),
        });
        assert_eq!(classify_error(&error), ErrorCategory::Permanent);
    }

    #[test]
    fn test_anyhow_classification() {
        let transient = BpError::Other(anyhow::anyhow!("connection reset by peer"));
        assert_eq!(classify_error(&transient), ErrorCategory::Transient);

        let permanent = BpError::Other(anyhow::anyhow!("bad things"));
        assert_eq!(classify_error(&permanent), ErrorCategory::Permanent);
    }

    #[test]
    fn test_error_display() {
        let error = BpError::Input(InputError::Malformed {
            line: 2,
            entry: "gs://bucket".to_string(),
            reason: "must end with '/'".to_string(),
        });
        let message = error.to_string();
        assert!(message.contains("line 2"));
        assert!(message.contains("gs://bucket"));
    }
}
