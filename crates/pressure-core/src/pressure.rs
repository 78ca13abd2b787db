//! Pressure computation.
//!
//! Two business rules live here and nowhere else:
//!
//! - a fleet reporting zero running workers divides by one, so the signal
//!   equals the raw backlog instead of being undefined;
//! - division truncates (`5 / 2 == 2`), never rounds.

use crate::types::{BacklogCount, PressureValue, WorkerCount};

/// Divisor used for a raw active-worker count.
pub fn effective_workers(raw: WorkerCount) -> WorkerCount {
    raw.max(1)
}

/// Backlog units per active worker, truncated.
pub fn compute_pressure(backlog: BacklogCount, raw_workers: WorkerCount) -> PressureValue {
    backlog / effective_workers(raw_workers)
}
