// src/error.rs
use thiserror::Error;

/// A single malformed source record. Recoverable: the caller decides between
/// skip-and-log (lenient) and abort-the-batch (strict).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("line {line}: malformed chat line: {reason}")]
    Line { line: usize, reason: String },
    #[error("row {row}: malformed message row: {reason}")]
    Row { row: usize, reason: String },
}

impl ParseError {
    pub fn line(line: usize, reason: impl Into<String>) -> Self {
        Self::Line {
            line,
            reason: reason.into(),
        }
    }

    pub fn row(row: usize, reason: impl Into<String>) -> Self {
        Self::Row {
            row,
            reason: reason.into(),
        }
    }
}

/// Classified failure from the remote playlist API.
///
/// `NotFound` and `Conflict` are always skips, never run failures.
/// `Permission` and `Other` mark the run failed but never abort the commit
/// loop — every candidate gets attempted.
#[derive(Error, Debug)]
pub enum RemoteError {
    #[error("video not found")]
    NotFound,
    #[error("video already in playlist")]
    Conflict,
    #[error("permission denied: {0}")]
    Permission(String),
    #[error("remote call failed: {0}")]
    Other(String),
}

impl RemoteError {
    pub fn other(err: impl std::fmt::Display) -> Self {
        Self::Other(err.to_string())
    }
}
