//! IndexerSettings - Config Loader output
//!
//! File-level description of an indexer: batching limits, default index,
//! request parameters and the HTTP endpoint.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

use crate::{Refresh, RequestParams};

/// Default flush threshold (5 MB)
pub const DEFAULT_FLUSH_BYTES: usize = 5_000_000;

/// Complete indexer settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexerSettings {
    /// Worker count (0 = number of available CPUs)
    #[serde(default)]
    pub workers: usize,

    /// Flush once a worker buffer reaches this many bytes
    #[serde(default = "default_flush_bytes")]
    pub flush_bytes: usize,

    /// Periodic flush interval in milliseconds (0 = disabled)
    #[serde(default)]
    pub flush_interval_ms: u64,

    /// Default index for items that name none
    #[serde(default)]
    pub index: Option<String>,

    /// Per-request parameters
    #[serde(default)]
    pub request: RequestSettings,

    /// Endpoint used by the HTTP flusher
    pub http: HttpSettings,
}

fn default_flush_bytes() -> usize {
    DEFAULT_FLUSH_BYTES
}

impl IndexerSettings {
    /// Flush interval, `None` when periodic flushing is disabled
    pub fn flush_interval(&self) -> Option<Duration> {
        (self.flush_interval_ms > 0).then(|| Duration::from_millis(self.flush_interval_ms))
    }
}

/// Bulk request parameters
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RequestSettings {
    #[serde(default)]
    pub pipeline: Option<String>,

    #[serde(default)]
    pub refresh: Option<Refresh>,

    #[serde(default)]
    pub routing: Option<String>,

    /// Server-side timeout in milliseconds
    #[serde(default)]
    pub timeout_ms: Option<u64>,

    #[serde(default)]
    pub require_alias: bool,
}

impl RequestSettings {
    pub fn to_params(&self) -> RequestParams {
        RequestParams {
            pipeline: self.pipeline.clone(),
            refresh: self.refresh,
            routing: self.routing.clone(),
            timeout: self.timeout_ms.map(Duration::from_millis),
            require_alias: self.require_alias,
        }
    }
}

/// HTTP endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpSettings {
    /// Base URL of the service, e.g. `http://localhost:9200`
    pub url: String,

    /// Extra headers sent with every request
    #[serde(default)]
    pub headers: HashMap<String, String>,

    /// Client-side request timeout in milliseconds
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

fn default_request_timeout_ms() -> u64 {
    30_000
}

impl HttpSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}
