//! BulkRequest - what a worker hands to the flusher

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Refresh policy applied by the service after the batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Refresh {
    True,
    False,
    WaitFor,
}

impl Refresh {
    pub fn as_str(&self) -> &'static str {
        match self {
            Refresh::True => "true",
            Refresh::False => "false",
            Refresh::WaitFor => "wait_for",
        }
    }
}

/// Request-level parameters forwarded with every flush
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestParams {
    /// Ingest pipeline
    pub pipeline: Option<String>,
    pub refresh: Option<Refresh>,
    /// Default routing for items that set none
    pub routing: Option<String>,
    /// Server-side operation timeout
    pub timeout: Option<Duration>,
    pub require_alias: bool,
}

impl RequestParams {
    /// Query-string pairs in a stable order
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(pipeline) = &self.pipeline {
            pairs.push(("pipeline", pipeline.clone()));
        }
        if let Some(refresh) = self.refresh {
            pairs.push(("refresh", refresh.as_str().to_string()));
        }
        if let Some(routing) = &self.routing {
            pairs.push(("routing", routing.clone()));
        }
        if let Some(timeout) = self.timeout {
            pairs.push(("timeout", format!("{}ms", timeout.as_millis())));
        }
        if self.require_alias {
            pairs.push(("require_alias", "true".to_string()));
        }
        pairs
    }
}

/// One bulk call
#[derive(Debug, Clone)]
pub struct BulkRequest {
    /// Default index for fragments that do not name one
    pub index: Option<String>,
    /// Concatenated NDJSON fragments
    pub body: Bytes,
    /// Number of operations in `body`
    pub item_count: usize,
    pub params: RequestParams,
}
