//! Minimal JSON-over-HTTP/1.1 client shared by the HTTP adapters.
//!
//! Opens one TCP connection per request and drives it with hyper's
//! low-level http1 client. The whole exchange runs under a single
//! timeout; expiry is reported as `SourceError::Timeout`.

use std::time::Duration;

use bytes::Bytes;
use http::header::{CONTENT_TYPE, HOST, USER_AGENT};
use http::{Method, Request, StatusCode};
use http_body_util::{BodyExt, Full};
use hyper_util::rt::TokioIo;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::net::TcpStream;
use tracing::debug;

use pressure_core::{SourceError, SourceResult};

const AGENT: &str = concat!("pressure-sources/", env!("CARGO_PKG_VERSION"));

/// Longest slice of an error body carried into a `SourceError`.
const MAX_ERROR_BODY: usize = 256;

/// HTTP client bound to one `host:port` endpoint.
#[derive(Debug, Clone)]
pub struct HttpClient {
    address: String,
    timeout: Duration,
}

impl HttpClient {
    pub fn new(address: impl Into<String>, timeout: Duration) -> Self {
        Self {
            address: address.into(),
            timeout,
        }
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// `GET` `path_and_query` and decode the JSON response body.
    pub async fn get_json<T: DeserializeOwned>(&self, path_and_query: &str) -> SourceResult<T> {
        let body = self.send(Method::GET, path_and_query, None).await?;
        serde_json::from_slice(&body).map_err(|e| SourceError::Malformed(e.to_string()))
    }

    /// `POST` `payload` as JSON to `path`; returns the raw response body.
    pub async fn post_json<B: Serialize>(&self, path: &str, payload: &B) -> SourceResult<Bytes> {
        let body = serde_json::to_vec(payload)
            .map_err(|e| SourceError::Malformed(format!("unencodable payload: {e}")))?;
        self.send(Method::POST, path, Some(body)).await
    }

    async fn send(&self, method: Method, path: &str, body: Option<Vec<u8>>) -> SourceResult<Bytes> {
        match tokio::time::timeout(self.timeout, self.exchange(method, path, body)).await {
            Ok(result) => result,
            Err(_) => {
                debug!(address = %self.address, %path, "request timed out");
                Err(SourceError::Timeout(self.timeout))
            }
        }
    }

    async fn exchange(
        &self,
        method: Method,
        path: &str,
        body: Option<Vec<u8>>,
    ) -> SourceResult<Bytes> {
        let stream = TcpStream::connect(&self.address).await.map_err(|e| {
            debug!(error = %e, address = %self.address, "connection failed");
            SourceError::Unavailable(format!("connect {}: {e}", self.address))
        })?;

        let io = TokioIo::new(stream);
        let (mut sender, conn) = hyper::client::conn::http1::handshake(io)
            .await
            .map_err(|e| SourceError::Unavailable(format!("handshake {}: {e}", self.address)))?;

        // Drive the connection in the background.
        tokio::spawn(async move {
            let _ = conn.await;
        });

        let mut builder = Request::builder()
            .method(method)
            .uri(path)
            .header(HOST, &self.address)
            .header(USER_AGENT, AGENT);
        if body.is_some() {
            builder = builder.header(CONTENT_TYPE, "application/json");
        }
        let req = builder
            .body(Full::new(Bytes::from(body.unwrap_or_default())))
            .map_err(|e| SourceError::Unavailable(format!("invalid request {path}: {e}")))?;

        let resp = sender.send_request(req).await.map_err(|e| {
            debug!(error = %e, address = %self.address, %path, "request failed");
            SourceError::Unavailable(format!("request {path}: {e}"))
        })?;

        let status = resp.status();
        let bytes = resp
            .into_body()
            .collect()
            .await
            .map_err(|e| SourceError::Unavailable(format!("reading body of {path}: {e}")))?
            .to_bytes();

        if !status.is_success() {
            debug!(%status, address = %self.address, %path, "non-2xx response");
        }
        classify(status, bytes)
    }
}

/// Map an HTTP status onto the collaborator error taxonomy.
pub fn classify(status: StatusCode, body: Bytes) -> SourceResult<Bytes> {
    if status.is_success() {
        return Ok(body);
    }

    let message = error_message(status, &body);
    Err(match status {
        StatusCode::NOT_FOUND => SourceError::NotFound(message),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => SourceError::AccessDenied(message),
        StatusCode::BAD_GATEWAY | StatusCode::SERVICE_UNAVAILABLE => {
            SourceError::Unavailable(message)
        }
        _ => SourceError::Rejected {
            status: status.as_u16(),
            message,
        },
    })
}

fn error_message(status: StatusCode, body: &[u8]) -> String {
    let text = String::from_utf8_lossy(body);
    let text = text.trim();
    if text.is_empty() {
        return status
            .canonical_reason()
            .unwrap_or("unknown status")
            .to_string();
    }
    text.chars().take(MAX_ERROR_BODY).collect()
}

/// Encode `pairs` as an `application/x-www-form-urlencoded` query string.
pub fn query(pairs: &[(&str, &str)]) -> String {
    let mut ser = url::form_urlencoded::Serializer::new(String::new());
    for (k, v) in pairs {
        ser.append_pair(k, v);
    }
    ser.finish()
}
