//! Cycle error types.

use serde::Serialize;
use thiserror::Error;

use pressure_core::{ConfigError, PressureValue, SourceError};

use crate::reporter::CycleReport;

/// Outcome of one evaluation cycle.
pub type CycleResult = Result<CycleReport, CycleError>;

/// Why a cycle ended without a metric reaching the sink.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CycleError {
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigError),

    #[error("backlog fetch failed for queue {queue}: {source}")]
    BacklogFetch { queue: String, source: SourceError },

    #[error("worker count fetch failed for {cluster}/{service}: {source}")]
    WorkerFetch {
        cluster: String,
        service: String,
        source: SourceError,
    },

    #[error("publishing pressure value {value} failed: {source}")]
    Publish {
        value: PressureValue,
        source: SourceError,
    },
}

/// The step a cycle failed at.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub enum CycleErrorKind {
    ConfigurationError,
    BacklogFetchError,
    WorkerFetchError,
    PublishError,
}

impl CycleError {
    pub fn kind(&self) -> CycleErrorKind {
        match self {
            CycleError::Configuration(_) => CycleErrorKind::ConfigurationError,
            CycleError::BacklogFetch { .. } => CycleErrorKind::BacklogFetchError,
            CycleError::WorkerFetch { .. } => CycleErrorKind::WorkerFetchError,
            CycleError::Publish { .. } => CycleErrorKind::PublishError,
        }
    }

    /// The collaborator failure behind this error, if any.
    pub fn source_error(&self) -> Option<&SourceError> {
        match self {
            CycleError::Configuration(_) => None,
            CycleError::BacklogFetch { source, .. }
            | CycleError::WorkerFetch { source, .. }
            | CycleError::Publish { source, .. } => Some(source),
        }
    }
}

impl std::fmt::Display for CycleErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            CycleErrorKind::ConfigurationError => "ConfigurationError",
            CycleErrorKind::BacklogFetchError => "BacklogFetchError",
            CycleErrorKind::WorkerFetchError => "WorkerFetchError",
            CycleErrorKind::PublishError => "PublishError",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn kind_maps_each_step() {
        let err = CycleError::from(ConfigError::MissingIdentifier("queue"));
        assert_eq!(err.kind(), CycleErrorKind::ConfigurationError);
        assert!(err.source_error().is_none());

        let err = CycleError::Publish {
            value: 3,
            source: SourceError::Unavailable("sink down".into()),
        };
        assert_eq!(err.kind(), CycleErrorKind::PublishError);
        assert_eq!(
            err.source_error(),
            Some(&SourceError::Unavailable("sink down".into()))
        );
    }

    #[test]
    fn display_names_step_and_cause() {
        let err = CycleError::BacklogFetch {
            queue: "orders".into(),
            source: SourceError::Timeout(Duration::from_secs(5)),
        };
        let msg = err.to_string();
        assert!(msg.contains("backlog fetch failed"));
        assert!(msg.contains("orders"));
        assert!(msg.contains("timed out"));
        assert_eq!(err.kind().to_string(), "BacklogFetchError");
    }
}
