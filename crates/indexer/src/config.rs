//! Indexer configuration and hooks

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use contracts::{IndexerSettings, RequestParams, DEFAULT_FLUSH_BYTES};

use crate::error::IndexerError;

/// Called for every batch whose outcome is unknown (transport or protocol failure)
pub type ErrorCallback = Arc<dyn Fn(&IndexerError) + Send + Sync>;

/// Called around every flush
pub type FlushHook = Arc<dyn Fn(&FlushInfo) + Send + Sync>;

/// What caused a flush
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushTrigger {
    /// Buffer reached the byte threshold
    Size,
    /// Periodic timer fired
    Interval,
    /// Indexer is closing
    Shutdown,
}

impl FlushTrigger {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlushTrigger::Size => "size",
            FlushTrigger::Interval => "interval",
            FlushTrigger::Shutdown => "shutdown",
        }
    }
}

/// Description of one flush, handed to the flush hooks
#[derive(Debug, Clone, Copy)]
pub struct FlushInfo {
    pub worker: usize,
    pub items: usize,
    pub bytes: usize,
    pub trigger: FlushTrigger,
}

/// Batching configuration
#[derive(Debug, Clone)]
pub struct IndexerConfig {
    /// Number of workers (and queue capacity)
    pub num_workers: usize,
    /// Per-worker flush threshold in encoded bytes
    pub flush_bytes: usize,
    /// Periodic flush interval; `None` disables it
    pub flush_interval: Option<Duration>,
    /// Default index sent with every request
    pub index: Option<String>,
    /// Request-level parameters sent with every flush
    pub params: RequestParams,
}

impl Default for IndexerConfig {
    fn default() -> Self {
        Self {
            num_workers: default_workers(),
            flush_bytes: DEFAULT_FLUSH_BYTES,
            flush_interval: None,
            index: None,
            params: RequestParams::default(),
        }
    }
}

fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

impl IndexerConfig {
    /// Replace out-of-range values with safe defaults
    pub fn normalized(mut self) -> Self {
        if self.num_workers == 0 {
            self.num_workers = default_workers();
        }
        if self.flush_bytes == 0 {
            self.flush_bytes = DEFAULT_FLUSH_BYTES;
        }
        if self.flush_interval.is_some_and(|d| d.is_zero()) {
            self.flush_interval = None;
        }
        if self.index.as_deref().is_some_and(str::is_empty) {
            self.index = None;
        }
        self
    }

    /// Shared queue capacity
    pub fn queue_capacity(&self) -> usize {
        self.num_workers.max(1)
    }
}

impl From<&IndexerSettings> for IndexerConfig {
    fn from(settings: &IndexerSettings) -> Self {
        Self {
            num_workers: settings.workers,
            flush_bytes: settings.flush_bytes,
            flush_interval: settings.flush_interval(),
            index: settings.index.clone(),
            params: settings.request.to_params(),
        }
        .normalized()
    }
}

/// Optional callbacks shared by all workers
#[derive(Clone, Default)]
pub(crate) struct Hooks {
    pub on_error: Option<ErrorCallback>,
    pub on_flush_start: Option<FlushHook>,
    pub on_flush_end: Option<FlushHook>,
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks")
            .field("on_error", &self.on_error.is_some())
            .field("on_flush_start", &self.on_flush_start.is_some())
            .field("on_flush_end", &self.on_flush_end.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalization() {
        let config = IndexerConfig {
            num_workers: 0,
            flush_bytes: 0,
            flush_interval: Some(Duration::ZERO),
            index: Some(String::new()),
            params: RequestParams::default(),
        }
        .normalized();

        assert!(config.num_workers >= 1);
        assert_eq!(config.flush_bytes, DEFAULT_FLUSH_BYTES);
        assert_eq!(config.flush_interval, None);
        assert_eq!(config.index, None);
        assert_eq!(config.queue_capacity(), config.num_workers);
    }

    #[test]
    fn test_explicit_values_survive() {
        let config = IndexerConfig {
            num_workers: 3,
            flush_bytes: 128,
            flush_interval: Some(Duration::from_millis(50)),
            index: Some("books".into()),
            params: RequestParams::default(),
        }
        .normalized();

        assert_eq!(config.num_workers, 3);
        assert_eq!(config.flush_bytes, 128);
        assert_eq!(config.flush_interval, Some(Duration::from_millis(50)));
    }
}
