//! Error metadata shared across crates
//!
//! Errors describe themselves through `ErrorMetadata` so callers can decide
//! how to log them and whether a retry makes sense. Nothing in this workspace
//! retries on its own.

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for recoverable issues like missing objects
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Self-description of an error for callers deciding on logging and retries
pub trait ErrorMetadata {
    /// Machine-readable error code (e.g., "STORAGE_NOT_CONFIGURED")
    fn error_code(&self) -> &'static str;

    /// Whether the same call may succeed if retried unchanged
    fn is_recoverable(&self) -> bool;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}
