//! Gauge sink with Prometheus text exposition.
//!
//! Keeps the most recent point per (namespace, metric) so a scraper can
//! pull the signal instead of having it pushed. Only the last value is
//! held; older points are overwritten.

use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock};

use tracing::debug;

use pressure_core::{MetricDataPoint, PublishMetric, SourceFuture};

/// In-process sink exposing the latest value of each metric.
#[derive(Debug, Default)]
pub struct GaugeSink {
    latest: RwLock<BTreeMap<(String, String), MetricDataPoint>>,
}

impl GaugeSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Latest point published under `namespace`/`name`.
    pub fn latest(&self, namespace: &str, name: &str) -> Option<MetricDataPoint> {
        self.latest
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&(namespace.to_string(), name.to_string()))
            .cloned()
    }

    /// Render every held gauge in Prometheus text format.
    ///
    /// Metric names are converted to snake case and the namespace becomes
    /// a label; samples carry their publication timestamp in milliseconds.
    pub fn render_prometheus(&self) -> String {
        let latest = self.latest.read().unwrap_or_else(PoisonError::into_inner);

        let mut by_name: BTreeMap<String, Vec<&MetricDataPoint>> = BTreeMap::new();
        for point in latest.values() {
            by_name.entry(snake_case(&point.name)).or_default().push(point);
        }

        let mut out = String::new();
        for (metric, points) in by_name {
            out.push_str(&format!(
                "# HELP {metric} Last published {} value.\n",
                points[0].name
            ));
            out.push_str(&format!("# TYPE {metric} gauge\n"));
            for p in points {
                out.push_str(&format!(
                    "{metric}{{namespace=\"{}\"}} {} {}\n",
                    escape_label(&p.namespace),
                    p.value,
                    p.timestamp.timestamp_millis()
                ));
            }
        }
        out
    }
}

impl PublishMetric for GaugeSink {
    fn publish<'a>(&'a self, point: &'a MetricDataPoint) -> SourceFuture<'a, ()> {
        self.latest
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert((point.namespace.clone(), point.name.clone()), point.clone());
        debug!(metric = %point.name, value = point.value, "gauge updated");
        Box::pin(async { Ok(()) })
    }
}

/// `QueueDepthPressure` → `queue_depth_pressure`.
fn snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for (i, c) in name.chars().enumerate() {
        if c.is_ascii_uppercase() {
            if i > 0 {
                out.push('_');
            }
            out.push(c.to_ascii_lowercase());
        } else if c.is_ascii_alphanumeric() {
            out.push(c);
        } else {
            out.push('_');
        }
    }
    out
}

fn escape_label(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}
