//! Active worker count over HTTP.
//!
//! `GET /tasks?cluster=<c>&service=<s>&desired_status=RUNNING` answering
//!
//! ```json
//! {"tasks": [{"id": "a1", "last_status": "RUNNING"}], "next_token": "…"}
//! ```
//!
//! Pages are followed through `next_token`. The server is asked for
//! running tasks only, and the same filter is applied again to every
//! page, so a server that ignores `desired_status` cannot inflate the
//! divisor.
//!
//! The client timeout bounds the whole listing, not each page.

use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use pressure_core::{
    FetchWorkerCount, SourceError, SourceFuture, SourceResult, WorkerCount, WorkerStatus,
};

use crate::client::{HttpClient, query};

/// Upper bound on pages followed for a single count.
const MAX_PAGES: usize = 100;

#[derive(Debug, Deserialize)]
struct TaskPage {
    tasks: Vec<TaskSummary>,
    next_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TaskSummary {
    last_status: WorkerStatus,
}

/// Worker-count source backed by a task listing endpoint.
#[derive(Debug, Clone)]
pub struct HttpWorkerSource {
    client: HttpClient,
}

impl HttpWorkerSource {
    pub fn new(address: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: HttpClient::new(address, timeout),
        }
    }

    fn page_path(cluster_id: &str, service_id: &str, token: Option<&str>) -> String {
        let mut pairs = vec![
            ("cluster", cluster_id),
            ("service", service_id),
            ("desired_status", "RUNNING"),
        ];
        if let Some(token) = token {
            pairs.push(("next_token", token));
        }
        format!("/tasks?{}", query(&pairs))
    }

    async fn count_pages(&self, cluster_id: &str, service_id: &str) -> SourceResult<WorkerCount> {
        let mut running: WorkerCount = 0;
        let mut token: Option<String> = None;

        for page_no in 0..MAX_PAGES {
            let path = Self::page_path(cluster_id, service_id, token.as_deref());
            let page: TaskPage = self.client.get_json(&path).await?;

            let active = page.tasks.iter().filter(|t| t.last_status.is_active()).count();
            running += active as WorkerCount;
            debug!(
                cluster = %cluster_id,
                service = %service_id,
                page = page_no,
                listed = page.tasks.len(),
                active,
                "task page read"
            );

            match page.next_token {
                Some(next) if !next.is_empty() => token = Some(next),
                _ => return Ok(running),
            }
        }

        Err(SourceError::Malformed(format!(
            "task listing for {cluster_id}/{service_id} exceeded {MAX_PAGES} pages"
        )))
    }
}

impl FetchWorkerCount for HttpWorkerSource {
    fn active_workers<'a>(
        &'a self,
        cluster_id: &'a str,
        service_id: &'a str,
    ) -> SourceFuture<'a, WorkerCount> {
        Box::pin(async move {
            let budget = self.client.timeout();
            match tokio::time::timeout(budget, self.count_pages(cluster_id, service_id)).await {
                Ok(result) => result,
                Err(_) => {
                    debug!(cluster = %cluster_id, service = %service_id, "task listing timed out");
                    Err(SourceError::Timeout(budget))
                }
            }
        })
    }
}
