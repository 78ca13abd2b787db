//! Invocation handlers.
//!
//! Successful cycles answer 200 with the published value; every failure
//! answers 400 with the failed step and its cause.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::Serialize;
use tracing::info;

use pressure_reporter::{CycleErrorKind, CycleReport, CycleResult};

use crate::ApiState;

/// Body returned to the invoking scheduler.
#[derive(Debug, Serialize)]
pub struct InvokeResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<CycleReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<CycleErrorKind>,
}

/// Map a cycle outcome to a status code and response body.
pub fn cycle_response(result: &CycleResult) -> (StatusCode, InvokeResponse) {
    match result {
        Ok(report) => (
            StatusCode::OK,
            InvokeResponse {
                success: true,
                data: Some(report.clone()),
                error: None,
                kind: None,
            },
        ),
        Err(e) => (
            StatusCode::BAD_REQUEST,
            InvokeResponse {
                success: false,
                data: None,
                error: Some(e.to_string()),
                kind: Some(e.kind()),
            },
        ),
    }
}

/// POST /invoke
///
/// Any request body (e.g. a scheduler event envelope) is ignored.
pub async fn invoke(State(state): State<ApiState>) -> impl IntoResponse {
    let result = state.reporter.run_cycle(&state.config).await;
    let (status, body) = cycle_response(&result);
    info!(status = status.as_u16(), success = body.success, "invocation handled");
    (status, Json(body))
}

/// GET /healthz
pub async fn healthz() -> &'static str {
    "ok"
}

/// GET /metrics
pub async fn prometheus_metrics(State(state): State<ApiState>) -> impl IntoResponse {
    match &state.gauge {
        Some(gauge) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
            gauge.render_prometheus(),
        )
            .into_response(),
        None => (StatusCode::NOT_FOUND, "no gauge sink attached").into_response(),
    }
}
