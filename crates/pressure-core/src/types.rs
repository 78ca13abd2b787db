//! Domain types for queue pressure reporting.
//!
//! Counts are plain unsigned integers. A `MetricDataPoint` is built once
//! per cycle and handed straight to the sink; nothing here is persisted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Metric name every published data point carries.
pub const METRIC_NAME: &str = "QueueDepthPressure";

/// Namespace every published data point is filed under.
pub const METRIC_NAMESPACE: &str = "CustomQueueDepthMetric";

/// Approximate number of units of work waiting in the queue.
pub type BacklogCount = u64;

/// Number of workers in the running state for a cluster/service pair.
pub type WorkerCount = u64;

/// Backlog units pending per active worker.
pub type PressureValue = u64;

/// A single timestamped pressure sample, ready for the metrics sink.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MetricDataPoint {
    pub name: String,
    pub namespace: String,
    pub value: PressureValue,
    pub timestamp: DateTime<Utc>,
}

impl MetricDataPoint {
    /// Build the `QueueDepthPressure` point for `value` at `timestamp`.
    pub fn pressure(value: PressureValue, timestamp: DateTime<Utc>) -> Self {
        Self {
            name: METRIC_NAME.to_string(),
            namespace: METRIC_NAMESPACE.to_string(),
            value,
            timestamp,
        }
    }
}

/// Lifecycle state of a worker as reported by the worker data source.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkerStatus {
    Provisioning,
    Pending,
    Activating,
    Running,
    Deactivating,
    Stopping,
    Stopped,
    #[serde(other)]
    Unknown,
}

impl WorkerStatus {
    /// Only running workers count towards the divisor.
    pub fn is_active(self) -> bool {
        self == WorkerStatus::Running
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pressure_point_uses_fixed_name_and_namespace() {
        let now = Utc::now();
        let point = MetricDataPoint::pressure(25, now);
        assert_eq!(point.name, "QueueDepthPressure");
        assert_eq!(point.namespace, "CustomQueueDepthMetric");
        assert_eq!(point.value, 25);
        assert_eq!(point.timestamp, now);
    }

    #[test]
    fn worker_status_parses_upstream_spelling() {
        let status: WorkerStatus = serde_json::from_str("\"RUNNING\"").unwrap();
        assert!(status.is_active());

        let status: WorkerStatus = serde_json::from_str("\"DEACTIVATING\"").unwrap();
        assert!(!status.is_active());

        let status: WorkerStatus = serde_json::from_str("\"SOMETHING_NEW\"").unwrap();
        assert_eq!(status, WorkerStatus::Unknown);
    }
}
