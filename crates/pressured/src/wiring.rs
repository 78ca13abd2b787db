//! Assemble a reporter from configuration.

use std::sync::Arc;

use tracing::info;

use pressure_core::{PublishMetric, ResolvedEndpoints};
use pressure_reporter::PressureMetricReporter;
use pressure_sources::*;

/// A reporter plus the gauge sink backing it, when there is one.
pub struct Wiring {
    pub reporter: PressureMetricReporter,
    pub gauge: Option<Arc<GaugeSink>>,
}

/// HTTP sources; HTTP sink if configured, otherwise an in-process gauge.
pub fn from_endpoints(endpoints: &ResolvedEndpoints) -> Wiring {
    let backlog = Arc::new(HttpBacklogSource::new(&endpoints.backlog, endpoints.timeout));
    let workers = Arc::new(HttpWorkerSource::new(&endpoints.workers, endpoints.timeout));

    let (sink, gauge) = match &endpoints.sink {
        Some(addr) => {
            let sink: Arc<dyn PublishMetric> = Arc::new(HttpMetricSink::new(addr, endpoints.timeout));
            (sink, None)
        }
        None => {
            let gauge = Arc::new(GaugeSink::new());
            let sink: Arc<dyn PublishMetric> = gauge.clone();
            (sink, Some(gauge))
        }
    };

    info!(
        backlog = %endpoints.backlog,
        workers = %endpoints.workers,
        sink = endpoints.sink.as_deref().unwrap_or("in-process gauge"),
        timeout_ms = endpoints.timeout.as_millis() as u64,
        "collaborators wired"
    );

    Wiring {
        reporter: PressureMetricReporter::new(backlog, workers, sink),
        gauge,
    }
}

/// Fixed in-memory counts published to an in-process gauge.
pub fn dry_run(backlog: u64, workers: u64) -> Wiring {
    let gauge = Arc::new(GaugeSink::new());
    info!(backlog, workers, "dry run: using fixed counts");
    Wiring {
        reporter: PressureMetricReporter::new(
            Arc::new(StaticBacklog::new(backlog)),
            Arc::new(StaticWorkers::new(workers)),
            gauge.clone(),
        ),
        gauge: Some(gauge),
    }
}
