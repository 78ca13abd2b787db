//! pressure-api — invocation boundary for the pressure reporter.
//!
//! An external scheduler calls `POST /invoke` on its cadence; each call
//! runs exactly one cycle and maps the outcome to a status code.
//!
//! # Routes
//!
//! | Method | Path | Description |
//! |---|---|---|
//! | POST | `/invoke` | Run one cycle: 200 with the value, 400 with the failure |
//! | GET | `/healthz` | Liveness |
//! | GET | `/metrics` | Prometheus exposition of the gauge sink, if attached |

pub mod handlers;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};

use pressure_core::ReporterConfig;
use pressure_reporter::PressureMetricReporter;
use pressure_sources::GaugeSink;

pub use handlers::{InvokeResponse, cycle_response};

/// Shared state for handlers.
#[derive(Clone)]
pub struct ApiState {
    pub reporter: PressureMetricReporter,
    /// Identifier bundle loaded at process start.
    pub config: Arc<ReporterConfig>,
    pub gauge: Option<Arc<GaugeSink>>,
}

/// Build the invocation router.
pub fn build_router(state: ApiState) -> Router {
    Router::new()
        .route("/invoke", post(handlers::invoke))
        .route("/healthz", get(handlers::healthz))
        .route("/metrics", get(handlers::prometheus_metrics))
        .with_state(state)
}
