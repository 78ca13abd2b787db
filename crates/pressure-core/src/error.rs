//! Error types shared by data sources, sinks, and configuration.

use std::time::Duration;

use thiserror::Error;

/// Result type alias for data source and sink calls.
pub type SourceResult<T> = Result<T, SourceError>;

/// Failure reported by an external collaborator (queue, fleet, or sink).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SourceError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("access denied: {0}")]
    AccessDenied(String),

    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("service unavailable: {0}")]
    Unavailable(String),

    #[error("request rejected with status {status}: {message}")]
    Rejected { status: u16, message: String },

    #[error("malformed response: {0}")]
    Malformed(String),
}

/// Invalid or incomplete reporter configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required identifier: {0}")]
    MissingIdentifier(&'static str),

    #[error("invalid duration: {0:?}")]
    InvalidDuration(String),

    #[error("invalid endpoint address: {0:?}")]
    InvalidAddress(String),
}
