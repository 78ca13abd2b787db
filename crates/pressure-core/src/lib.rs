//! pressure-core — shared types for the queue pressure reporter.
//!
//! Holds the data model (backlog, worker count, pressure value, metric
//! data point), the capability traits the reporter is written against,
//! the pure pressure computation, and configuration parsing.
//!
//! ```text
//! FetchBacklog ──┐
//!                ├── compute_pressure() ──► MetricDataPoint ──► PublishMetric
//! FetchWorkerCount
//! ```

pub mod capability;
pub mod config;
pub mod error;
pub mod pressure;
pub mod types;

pub use capability::{FetchBacklog, FetchWorkerCount, PublishMetric, SourceFuture};
pub use config::{EndpointsConfig, PressureConfig, ReporterConfig, ResolvedEndpoints};
pub use error::{ConfigError, SourceError, SourceResult};
pub use pressure::{compute_pressure, effective_workers};
pub use types::*;
