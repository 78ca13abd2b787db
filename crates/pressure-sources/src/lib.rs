//! pressure-sources — implementations of the reporter's collaborators.
//!
//! # Architecture
//!
//! ```text
//! FetchBacklog      ── HttpBacklogSource  GET  /queue-attributes
//!                   └─ StaticBacklog      (in-memory)
//! FetchWorkerCount  ── HttpWorkerSource   GET  /tasks?desired_status=RUNNING
//!                   └─ StaticWorkers      (in-memory)
//! PublishMetric     ── HttpMetricSink     POST /metric-data
//!                   ├─ GaugeSink          (last value, Prometheus text)
//!                   └─ RecordingSink      (in-memory)
//! ```
//!
//! The HTTP adapters share one small hyper client that maps transport
//! failures and HTTP statuses onto `SourceError`.

pub mod client;
pub mod fleet;
pub mod gauge;
pub mod memory;
pub mod queue;
pub mod sink;

pub use client::HttpClient;
pub use fleet::HttpWorkerSource;
pub use gauge::GaugeSink;
pub use memory::{RecordingSink, StaticBacklog, StaticWorkers};
pub use queue::HttpBacklogSource;
pub use sink::HttpMetricSink;

#[cfg(test)]
mod testing;
