//! Metric publication over HTTP.
//!
//! `POST /metric-data` with
//!
//! ```json
//! {
//!   "namespace": "CustomQueueDepthMetric",
//!   "metric_data": [
//!     {"metric_name": "QueueDepthPressure", "value": 25, "timestamp": "2024-05-01T12:00:00Z"}
//!   ]
//! }
//! ```
//!
//! Any 2xx response is an acknowledgement.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use pressure_core::{MetricDataPoint, PressureValue, PublishMetric, SourceFuture};

use crate::client::HttpClient;

#[derive(Debug, Serialize)]
struct PutMetricData<'a> {
    namespace: &'a str,
    metric_data: [MetricDatum<'a>; 1],
}

#[derive(Debug, Serialize)]
struct MetricDatum<'a> {
    metric_name: &'a str,
    value: PressureValue,
    timestamp: DateTime<Utc>,
}

/// Metrics sink backed by a metric ingestion endpoint.
#[derive(Debug, Clone)]
pub struct HttpMetricSink {
    client: HttpClient,
}

impl HttpMetricSink {
    pub fn new(address: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: HttpClient::new(address, timeout),
        }
    }
}

impl PublishMetric for HttpMetricSink {
    fn publish<'a>(&'a self, point: &'a MetricDataPoint) -> SourceFuture<'a, ()> {
        Box::pin(async move {
            let body = PutMetricData {
                namespace: &point.namespace,
                metric_data: [MetricDatum {
                    metric_name: &point.name,
                    value: point.value,
                    timestamp: point.timestamp,
                }],
            };
            self.client.post_json("/metric-data", &body).await?;
            debug!(
                address = %self.client.address(),
                metric = %point.name,
                value = point.value,
                "metric data accepted"
            );
            Ok(())
        })
    }
}
