//! # Error Types
//!
//! Custom error types for the transect toolkit using `thiserror`.
//!
//! Per-frame decode failures never appear here: the log reader absorbs them
//! (logged and skipped). These variants are run-level failures that abort a
//! conversion before any output file exists.

use thiserror::Error;

/// Main error type for the transect toolkit
#[derive(Debug, Error)]
pub enum TransectError {
    /// Telemetry log container unreadable (truncated or corrupt framing)
    #[error("telemetry log decode error: {0}")]
    Decode(String),

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// Fused mode requested but the log carries no fused position samples
    #[error("fused mode requested but no GLOBAL_POSITION_INT samples were found")]
    MissingFusedPosition,

    /// Unfused mode with no GPS fix, no fused fix, and no configured origin
    #[error("dead reckoning needs an origin: no GPS fix, no fused fix, and none configured")]
    MissingOrigin,

    /// Zero epoch records produced (e.g. the time bound excludes all data)
    #[error("no epoch records produced; nothing to export")]
    EmptyTrack,

    /// Start/end bound could not be parsed or is inverted
    #[error("invalid time bound: {0}")]
    InvalidTimeBound(String),

    /// CSV read/write errors
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for the transect toolkit
pub type Result<T> = std::result::Result<T, TransectError>;
