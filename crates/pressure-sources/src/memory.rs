//! In-memory collaborators.
//!
//! Each fake answers with a configurable result and counts how often it
//! was called. Used by tests throughout the workspace and by the
//! daemon's `--dry-run` mode.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use pressure_core::*;

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Backlog source that answers with a fixed result.
#[derive(Debug)]
pub struct StaticBacklog {
    result: Mutex<SourceResult<BacklogCount>>,
    last_queue: Mutex<Option<String>>,
    calls: AtomicUsize,
}

impl StaticBacklog {
    pub fn new(count: BacklogCount) -> Self {
        Self::with_result(Ok(count))
    }

    pub fn failing(err: SourceError) -> Self {
        Self::with_result(Err(err))
    }

    fn with_result(result: SourceResult<BacklogCount>) -> Self {
        Self {
            result: Mutex::new(result),
            last_queue: Mutex::new(None),
            calls: AtomicUsize::new(0),
        }
    }

    /// Replace the answer given to subsequent calls.
    pub fn set(&self, result: SourceResult<BacklogCount>) {
        *lock(&self.result) = result;
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Queue identifier passed to the most recent call.
    pub fn last_queue(&self) -> Option<String> {
        lock(&self.last_queue).clone()
    }
}

impl FetchBacklog for StaticBacklog {
    fn approximate_backlog<'a>(&'a self, queue_id: &'a str) -> SourceFuture<'a, BacklogCount> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *lock(&self.last_queue) = Some(queue_id.to_string());
        let result = lock(&self.result).clone();
        Box::pin(async move { result })
    }
}

/// Worker-count source that answers with a fixed result.
#[derive(Debug)]
pub struct StaticWorkers {
    result: Mutex<SourceResult<WorkerCount>>,
    last_query: Mutex<Option<(String, String)>>,
    calls: AtomicUsize,
}

impl StaticWorkers {
    pub fn new(count: WorkerCount) -> Self {
        Self::with_result(Ok(count))
    }

    pub fn failing(err: SourceError) -> Self {
        Self::with_result(Err(err))
    }

    fn with_result(result: SourceResult<WorkerCount>) -> Self {
        Self {
            result: Mutex::new(result),
            last_query: Mutex::new(None),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn set(&self, result: SourceResult<WorkerCount>) {
        *lock(&self.result) = result;
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// `(cluster, service)` passed to the most recent call.
    pub fn last_query(&self) -> Option<(String, String)> {
        lock(&self.last_query).clone()
    }
}

impl FetchWorkerCount for StaticWorkers {
    fn active_workers<'a>(
        &'a self,
        cluster_id: &'a str,
        service_id: &'a str,
    ) -> SourceFuture<'a, WorkerCount> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *lock(&self.last_query) = Some((cluster_id.to_string(), service_id.to_string()));
        let result = lock(&self.result).clone();
        Box::pin(async move { result })
    }
}

/// Sink that keeps every accepted point, or fails on demand.
#[derive(Debug, Default)]
pub struct RecordingSink {
    points: Mutex<Vec<MetricDataPoint>>,
    failure: Mutex<Option<SourceError>>,
    calls: AtomicUsize,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(err: SourceError) -> Self {
        let sink = Self::default();
        sink.fail_with(Some(err));
        sink
    }

    /// Make subsequent publishes fail with `err`, or succeed with `None`.
    pub fn fail_with(&self, err: Option<SourceError>) {
        *lock(&self.failure) = err;
    }

    /// Points accepted so far, oldest first.
    pub fn points(&self) -> Vec<MetricDataPoint> {
        lock(&self.points).clone()
    }

    /// Publish attempts, including failed ones.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl PublishMetric for RecordingSink {
    fn publish<'a>(&'a self, point: &'a MetricDataPoint) -> SourceFuture<'a, ()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let result = match lock(&self.failure).clone() {
            Some(err) => Err(err),
            None => {
                lock(&self.points).push(point.clone());
                Ok(())
            }
        };
        Box::pin(async move { result })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::time::Duration;

    #[tokio::test]
    async fn static_backlog_counts_calls_and_switches_answers() {
        let source = StaticBacklog::new(12);
        assert_eq!(source.approximate_backlog("q").await, Ok(12));

        source.set(Err(SourceError::Timeout(Duration::from_secs(1))));
        assert!(source.approximate_backlog("q2").await.is_err());
        assert_eq!(source.calls(), 2);
        assert_eq!(source.last_queue().as_deref(), Some("q2"));
    }

    #[tokio::test]
    async fn failing_workers_report_error() {
        let source = StaticWorkers::failing(SourceError::NotFound("svc".into()));
        assert_eq!(
            source.active_workers("c", "s").await,
            Err(SourceError::NotFound("svc".into()))
        );
        assert_eq!(source.last_query(), Some(("c".into(), "s".into())));
    }

    #[tokio::test]
    async fn recording_sink_keeps_only_accepted_points() {
        let sink = RecordingSink::new();
        let point = MetricDataPoint::pressure(4, Utc::now());

        sink.publish(&point).await.unwrap();
        sink.fail_with(Some(SourceError::Unavailable("down".into())));
        assert!(sink.publish(&point).await.is_err());

        assert_eq!(sink.calls(), 2);
        assert_eq!(sink.points(), vec![point]);
    }
}
