//! Queue backlog over HTTP.
//!
//! `GET /queue-attributes?queue=<id>` answering
//! `{"approximate_number_of_messages": 17}`. The count may also arrive
//! as a numeric string, which is how queue services commonly encode
//! attribute values.

use std::time::Duration;

use serde::{Deserialize, Deserializer};
use tracing::debug;

use pressure_core::{BacklogCount, FetchBacklog, SourceFuture};

use crate::client::{HttpClient, query};

#[derive(Debug, Deserialize)]
struct QueueAttributes {
    #[serde(deserialize_with = "count_or_numeric_string")]
    approximate_number_of_messages: BacklogCount,
}

/// Backlog source backed by a queue attributes endpoint.
#[derive(Debug, Clone)]
pub struct HttpBacklogSource {
    client: HttpClient,
}

impl HttpBacklogSource {
    pub fn new(address: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: HttpClient::new(address, timeout),
        }
    }
}

impl FetchBacklog for HttpBacklogSource {
    fn approximate_backlog<'a>(&'a self, queue_id: &'a str) -> SourceFuture<'a, BacklogCount> {
        Box::pin(async move {
            let path = format!("/queue-attributes?{}", query(&[("queue", queue_id)]));
            let attrs: QueueAttributes = self.client.get_json(&path).await?;
            debug!(
                queue = %queue_id,
                backlog = attrs.approximate_number_of_messages,
                "queue attributes read"
            );
            Ok(attrs.approximate_number_of_messages)
        })
    }
}

fn count_or_numeric_string<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(u64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(n) => Ok(n),
        Raw::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}
