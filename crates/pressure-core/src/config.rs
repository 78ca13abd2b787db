//! Reporter configuration.
//!
//! `ReporterConfig` is the identifier bundle passed into every cycle. It
//! is assembled once at process start from an optional `pressure.toml`
//! and the environment, with environment values taking precedence.
//!
//! ```toml
//! [identifiers]
//! queue = "orders"
//! cluster = "batch"
//! service = "order-worker"
//!
//! [endpoints]
//! backlog = "127.0.0.1:9324"
//! workers = "127.0.0.1:9325"
//! sink = "127.0.0.1:9326"
//! timeout = "5s"
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Environment variable holding the queue identifier.
pub const QUEUE_ENV: &str = "QUEUE_URL";
/// Environment variable holding the worker cluster identifier.
pub const CLUSTER_ENV: &str = "ECS_CLUSTER_NAME";
/// Environment variable holding the worker service identifier.
pub const SERVICE_ENV: &str = "ECS_SERVICE_NAME";

/// Accepted names for the cluster identifier, highest precedence first.
const CLUSTER_KEYS: [&str; 2] = [CLUSTER_ENV, "CLUSTER_NAME"];
/// Accepted names for the service identifier, highest precedence first.
const SERVICE_KEYS: [&str; 2] = [SERVICE_ENV, "SERVICE_NAME"];

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Identifiers one evaluation cycle operates on.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReporterConfig {
    pub queue_id: String,
    pub cluster_id: String,
    pub service_id: String,
}

impl ReporterConfig {
    pub fn new(
        queue_id: impl Into<String>,
        cluster_id: impl Into<String>,
        service_id: impl Into<String>,
    ) -> Self {
        Self {
            queue_id: queue_id.into(),
            cluster_id: cluster_id.into(),
            service_id: service_id.into(),
        }
    }

    /// Read identifiers from the process environment.
    ///
    /// Unset variables become empty strings; they are rejected by
    /// `validate()` when a cycle runs, not here.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read identifiers through an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            queue_id: first_set(&lookup, &[QUEUE_ENV]).unwrap_or_default(),
            cluster_id: first_set(&lookup, &CLUSTER_KEYS).unwrap_or_default(),
            service_id: first_set(&lookup, &SERVICE_KEYS).unwrap_or_default(),
        }
    }

    /// Every identifier must be present and not blank.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fields = [
            ("queue", &self.queue_id),
            ("cluster", &self.cluster_id),
            ("service", &self.service_id),
        ];
        for (name, value) in fields {
            if value.trim().is_empty() {
                return Err(ConfigError::MissingIdentifier(name));
            }
        }
        Ok(())
    }
}

/// On-disk configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PressureConfig {
    #[serde(default)]
    pub identifiers: IdentifiersConfig,
    pub endpoints: Option<EndpointsConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IdentifiersConfig {
    pub queue: Option<String>,
    pub cluster: Option<String>,
    pub service: Option<String>,
}

/// Addresses (`host:port`) of the HTTP data sources and sink.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EndpointsConfig {
    pub backlog: String,
    pub workers: String,
    /// Push endpoint for metric data. Without one, points are held in
    /// process and served on `/metrics`.
    pub sink: Option<String>,
    /// Per-request timeout, e.g. `"5s"` or `"800ms"`.
    pub timeout: Option<String>,
}

/// Validated endpoint settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedEndpoints {
    pub backlog: String,
    pub workers: String,
    pub sink: Option<String>,
    pub timeout: Duration,
}

impl PressureConfig {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: PressureConfig = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Merge file identifiers with the process environment.
    pub fn reporter_config(&self) -> ReporterConfig {
        self.reporter_config_with(|key| std::env::var(key).ok())
    }

    /// Merge file identifiers with `lookup`; non-empty lookup values win.
    pub fn reporter_config_with(&self, lookup: impl Fn(&str) -> Option<String>) -> ReporterConfig {
        let pick = |keys: &[&str], file: &Option<String>| {
            first_set(&lookup, keys)
                .or_else(|| file.clone())
                .unwrap_or_default()
        };
        ReporterConfig {
            queue_id: pick(&[QUEUE_ENV], &self.identifiers.queue),
            cluster_id: pick(&CLUSTER_KEYS, &self.identifiers.cluster),
            service_id: pick(&SERVICE_KEYS, &self.identifiers.service),
        }
    }
}

/// First non-empty value among `keys`.
fn first_set(lookup: &impl Fn(&str) -> Option<String>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|key| lookup(key).filter(|v| !v.is_empty()))
}

impl EndpointsConfig {
    /// Normalize addresses and parse the timeout.
    pub fn resolve(&self) -> Result<ResolvedEndpoints, ConfigError> {
        let timeout = match &self.timeout {
            Some(s) => parse_duration(s).ok_or_else(|| ConfigError::InvalidDuration(s.clone()))?,
            None => DEFAULT_REQUEST_TIMEOUT,
        };
        Ok(ResolvedEndpoints {
            backlog: normalize_address(&self.backlog)?,
            workers: normalize_address(&self.workers)?,
            sink: self.sink.as_deref().map(normalize_address).transpose()?,
            timeout,
        })
    }
}

/// Strip an optional `http://` scheme and trailing slash.
pub fn normalize_address(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim();
    let addr = trimmed
        .strip_prefix("http://")
        .unwrap_or(trimmed)
        .trim_end_matches('/');
    if addr.is_empty() || addr.contains('/') || !addr.contains(':') {
        return Err(ConfigError::InvalidAddress(raw.to_string()));
    }
    Ok(addr.to_string())
}

/// Parse a duration string like `"500ms"`, `"10s"`, `"2m"`; bare numbers are seconds.
pub fn parse_duration(s: &str) -> Option<Duration> {
    let s = s.trim();
    if let Some(secs) = s.strip_suffix('s') {
        if let Some(ms) = secs.strip_suffix('m') {
            ms.parse::<u64>().ok().map(Duration::from_millis)
        } else {
            secs.parse::<u64>().ok().map(Duration::from_secs)
        }
    } else if let Some(mins) = s.strip_suffix('m') {
        mins.parse::<u64>()
            .ok()
            .and_then(|m| m.checked_mul(60))
            .map(Duration::from_secs)
    } else {
        s.parse::<u64>().ok().map(Duration::from_secs)
    }
}
