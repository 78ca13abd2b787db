//! Capability traits for the reporter's external collaborators.
//!
//! Each trait covers exactly one external call. Implementations are
//! injected into the reporter, so tests substitute in-memory fakes and
//! the daemon substitutes HTTP clients without the reporter noticing.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::error::SourceResult;
use crate::types::{BacklogCount, MetricDataPoint, WorkerCount};

/// Boxed future returned by every capability call.
pub type SourceFuture<'a, T> = Pin<Box<dyn Future<Output = SourceResult<T>> + Send + 'a>>;

/// Reads the approximate backlog of a queue.
pub trait FetchBacklog: Send + Sync {
    fn approximate_backlog<'a>(&'a self, queue_id: &'a str) -> SourceFuture<'a, BacklogCount>;
}

/// Counts the running workers of a cluster/service pair.
///
/// Implementations must count only workers in the running state. A count
/// of zero is a valid answer.
pub trait FetchWorkerCount: Send + Sync {
    fn active_workers<'a>(
        &'a self,
        cluster_id: &'a str,
        service_id: &'a str,
    ) -> SourceFuture<'a, WorkerCount>;
}

/// Writes a metric data point to the metrics sink.
pub trait PublishMetric: Send + Sync {
    fn publish<'a>(&'a self, point: &'a MetricDataPoint) -> SourceFuture<'a, ()>;
}

impl<T: FetchBacklog + ?Sized> FetchBacklog for Arc<T> {
    fn approximate_backlog<'a>(&'a self, queue_id: &'a str) -> SourceFuture<'a, BacklogCount> {
        (**self).approximate_backlog(queue_id)
    }
}

impl<T: FetchWorkerCount + ?Sized> FetchWorkerCount for Arc<T> {
    fn active_workers<'a>(
        &'a self,
        cluster_id: &'a str,
        service_id: &'a str,
    ) -> SourceFuture<'a, WorkerCount> {
        (**self).active_workers(cluster_id, service_id)
    }
}

impl<T: PublishMetric + ?Sized> PublishMetric for Arc<T> {
    fn publish<'a>(&'a self, point: &'a MetricDataPoint) -> SourceFuture<'a, ()> {
        (**self).publish(point)
    }
}
