//! PressureMetricReporter — one evaluation cycle per invocation.
//!
//! The reporter owns handles to its three collaborators and nothing
//! else. Every call to `run_cycle()` is independent: no counts, values,
//! or timestamps are carried from one cycle to the next.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use pressure_core::*;

use crate::error::{CycleError, CycleResult};

/// Clock used to timestamp data points.
pub type Clock = fn() -> DateTime<Utc>;

/// What a successful cycle observed and published.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CycleReport {
    /// The pressure value handed to the sink.
    pub value: PressureValue,
    pub backlog: BacklogCount,
    /// Worker count as reported, before the floor is applied.
    pub raw_workers: WorkerCount,
    pub point: MetricDataPoint,
}

/// Fetches backlog and worker counts, computes pressure, publishes it.
#[derive(Clone)]
pub struct PressureMetricReporter {
    backlog: Arc<dyn FetchBacklog>,
    workers: Arc<dyn FetchWorkerCount>,
    sink: Arc<dyn PublishMetric>,
    clock: Clock,
}

impl PressureMetricReporter {
    /// Create a reporter over the given collaborators.
    pub fn new(
        backlog: Arc<dyn FetchBacklog>,
        workers: Arc<dyn FetchWorkerCount>,
        sink: Arc<dyn PublishMetric>,
    ) -> Self {
        Self {
            backlog,
            workers,
            sink,
            clock: Utc::now,
        }
    }

    /// Replace the clock used for data point timestamps.
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Run one evaluation cycle.
    ///
    /// Performs at most one backlog read, one worker-count read and one
    /// publish, in that order. A failed step ends the cycle immediately.
    pub async fn run_cycle(&self, config: &ReporterConfig) -> CycleResult {
        if let Err(e) = config.validate() {
            warn!(step = "validate", error = %e, "pressure cycle rejected");
            return Err(e.into());
        }

        let backlog = self
            .backlog
            .approximate_backlog(&config.queue_id)
            .await
            .map_err(|source| {
                warn!(step = "fetch_backlog", queue = %config.queue_id, error = %source, "pressure cycle failed");
                CycleError::BacklogFetch {
                    queue: config.queue_id.clone(),
                    source,
                }
            })?;
        debug!(queue = %config.queue_id, backlog, "backlog fetched");

        let raw_workers = self
            .workers
            .active_workers(&config.cluster_id, &config.service_id)
            .await
            .map_err(|source| {
                warn!(
                    step = "fetch_workers",
                    cluster = %config.cluster_id,
                    service = %config.service_id,
                    error = %source,
                    "pressure cycle failed"
                );
                CycleError::WorkerFetch {
                    cluster: config.cluster_id.clone(),
                    service: config.service_id.clone(),
                    source,
                }
            })?;
        debug!(
            cluster = %config.cluster_id,
            service = %config.service_id,
            raw_workers,
            effective_workers = effective_workers(raw_workers),
            "active workers fetched"
        );

        let value = compute_pressure(backlog, raw_workers);
        let point = MetricDataPoint::pressure(value, (self.clock)());

        if let Err(source) = self.sink.publish(&point).await {
            warn!(step = "publish", value, error = %source, "pressure cycle failed");
            return Err(CycleError::Publish { value, source });
        }

        info!(
            metric = %point.name,
            namespace = %point.namespace,
            value,
            backlog,
            raw_workers,
            "pressure metric published"
        );

        Ok(CycleReport {
            value,
            backlog,
            raw_workers,
            point,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::time::Duration;

    use pressure_sources::memory::{RecordingSink, StaticBacklog, StaticWorkers};

    use crate::error::CycleErrorKind;

    struct Fixture {
        backlog: Arc<StaticBacklog>,
        workers: Arc<StaticWorkers>,
        sink: Arc<RecordingSink>,
        reporter: PressureMetricReporter,
    }

    fn fixture(backlog: BacklogCount, workers: WorkerCount) -> Fixture {
        let backlog = Arc::new(StaticBacklog::new(backlog));
        let workers = Arc::new(StaticWorkers::new(workers));
        let sink = Arc::new(RecordingSink::new());
        let reporter = PressureMetricReporter::new(backlog.clone(), workers.clone(), sink.clone());
        Fixture {
            backlog,
            workers,
            sink,
            reporter,
        }
    }

    fn config() -> ReporterConfig {
        ReporterConfig::new("orders", "batch", "order-worker")
    }

    fn fixed_clock() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap_or_default()
    }

    #[tokio::test]
    async fn publishes_backlog_per_worker() {
        let f = fixture(100, 4);
        let report = f.reporter.run_cycle(&config()).await.unwrap();

        assert_eq!(report.value, 25);
        assert_eq!(report.backlog, 100);
        assert_eq!(report.raw_workers, 4);

        let points = f.sink.points();
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].name, "QueueDepthPressure");
        assert_eq!(points[0].namespace, "CustomQueueDepthMetric");
        assert_eq!(points[0].value, 25);
    }

    #[tokio::test]
    async fn zero_workers_publishes_raw_backlog() {
        let f = fixture(1, 0);
        let report = f.reporter.run_cycle(&config()).await.unwrap();
        assert_eq!(report.value, 1);
        assert_eq!(report.raw_workers, 0);
        assert_eq!(f.sink.points()[0].value, 1);
    }

    #[tokio::test]
    async fn truncates_fractional_pressure() {
        let f = fixture(5, 2);
        let report = f.reporter.run_cycle(&config()).await.unwrap();
        assert_eq!(report.value, 2);
    }

    #[tokio::test]
    async fn successful_cycle_calls_each_collaborator_once() {
        let f = fixture(10, 3);
        f.reporter.run_cycle(&config()).await.unwrap();

        assert_eq!(f.backlog.calls(), 1);
        assert_eq!(f.workers.calls(), 1);
        assert_eq!(f.sink.calls(), 1);
        assert_eq!(f.backlog.last_queue().as_deref(), Some("orders"));
        assert_eq!(
            f.workers.last_query(),
            Some(("batch".to_string(), "order-worker".to_string()))
        );
    }

    #[tokio::test]
    async fn timestamps_with_injected_clock() {
        let f = fixture(8, 2);
        let reporter = f.reporter.clone().with_clock(fixed_clock);
        let report = reporter.run_cycle(&config()).await.unwrap();
        assert_eq!(report.point.timestamp, fixed_clock());
        assert_eq!(f.sink.points()[0].timestamp, fixed_clock());
    }

    #[tokio::test]
    async fn missing_identifier_makes_no_external_calls() {
        let f = fixture(10, 1);
        let bad = ReporterConfig::new("orders", "", "order-worker");

        let err = f.reporter.run_cycle(&bad).await.unwrap_err();
        assert_eq!(err.kind(), CycleErrorKind::ConfigurationError);
        assert_eq!(f.backlog.calls(), 0);
        assert_eq!(f.workers.calls(), 0);
        assert_eq!(f.sink.calls(), 0);
    }

    #[tokio::test]
    async fn backlog_timeout_skips_workers_and_publish() {
        let f = fixture(0, 1);
        f.backlog
            .set(Err(SourceError::Timeout(Duration::from_secs(5))));

        let err = f.reporter.run_cycle(&config()).await.unwrap_err();
        assert_eq!(err.kind(), CycleErrorKind::BacklogFetchError);
        assert_eq!(
            err.source_error(),
            Some(&SourceError::Timeout(Duration::from_secs(5)))
        );
        assert_eq!(f.workers.calls(), 0);
        assert_eq!(f.sink.calls(), 0);
        assert!(f.sink.points().is_empty());
    }

    #[tokio::test]
    async fn worker_access_denied_skips_publish() {
        let f = fixture(50, 1);
        f.workers
            .set(Err(SourceError::AccessDenied("ecs:ListTasks".into())));

        let err = f.reporter.run_cycle(&config()).await.unwrap_err();
        assert_eq!(err.kind(), CycleErrorKind::WorkerFetchError);
        assert_eq!(f.backlog.calls(), 1);
        assert_eq!(f.sink.calls(), 0);
        assert!(f.sink.points().is_empty());
    }

    #[tokio::test]
    async fn publish_failure_is_distinct_from_fetch_failures() {
        let f = fixture(12, 4);
        f.sink
            .fail_with(Some(SourceError::Unavailable("sink unreachable".into())));

        let err = f.reporter.run_cycle(&config()).await.unwrap_err();
        assert_eq!(err.kind(), CycleErrorKind::PublishError);
        assert!(matches!(err, CycleError::Publish { value: 3, .. }));
        assert_eq!(f.backlog.calls(), 1);
        assert_eq!(f.workers.calls(), 1);
        assert_eq!(f.sink.calls(), 1);
    }

    #[tokio::test]
    async fn cycles_do_not_share_state() {
        let f = fixture(100, 4);
        let first = f.reporter.run_cycle(&config()).await.unwrap();

        f.backlog.set(Ok(9));
        f.workers.set(Ok(0));
        let second = f.reporter.run_cycle(&config()).await.unwrap();

        assert_eq!(first.value, 25);
        assert_eq!(second.value, 9);
        assert_eq!(f.sink.points().len(), 2);
    }

    /// Records the order collaborators are called in.
    #[derive(Default)]
    struct CallLog(Mutex<Vec<&'static str>>);

    impl CallLog {
        fn push(&self, call: &'static str) {
            self.0.lock().unwrap().push(call);
        }
    }

    impl FetchBacklog for CallLog {
        fn approximate_backlog<'a>(&'a self, _queue_id: &'a str) -> SourceFuture<'a, BacklogCount> {
            Box::pin(async move {
                self.push("backlog");
                Ok(6)
            })
        }
    }

    impl FetchWorkerCount for CallLog {
        fn active_workers<'a>(
            &'a self,
            _cluster_id: &'a str,
            _service_id: &'a str,
        ) -> SourceFuture<'a, WorkerCount> {
            Box::pin(async move {
                self.push("workers");
                Ok(2)
            })
        }
    }

    impl PublishMetric for CallLog {
        fn publish<'a>(&'a self, _point: &'a MetricDataPoint) -> SourceFuture<'a, ()> {
            Box::pin(async move {
                self.push("publish");
                Ok(())
            })
        }
    }

    #[tokio::test]
    async fn publish_happens_after_both_fetches() {
        let log = Arc::new(CallLog::default());
        let reporter = PressureMetricReporter::new(log.clone(), log.clone(), log.clone());

        reporter.run_cycle(&config()).await.unwrap();

        assert_eq!(*log.0.lock().unwrap(), vec!["backlog", "workers", "publish"]);
    }
}
