//! pressure-reporter — the queue pressure evaluation cycle.
//!
//! One call to `PressureMetricReporter::run_cycle()` performs one
//! stateless evaluation:
//!
//! ```text
//! Validate ─► FetchBacklog ─► FetchWorkers ─► Compute ─► Publish ─► Done
//!    │             │               │                        │
//!    └─────────────┴───────────────┴────────────────────────┴──► Failure
//! ```
//!
//! Any step failing ends the cycle with a `CycleError` naming that step.
//! Nothing is retried; the next scheduled invocation supersedes a failed
//! one.

pub mod error;
pub mod reporter;

pub use error::{CycleError, CycleErrorKind, CycleResult};
pub use reporter::{CycleReport, PressureMetricReporter};
