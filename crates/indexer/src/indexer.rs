//! BulkIndexer - queue front end and worker lifecycle

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_channel::TrySendError;
use contracts::{
    ContractError, Encoder, Flusher, IndexerSettings, Item, RequestParams, ResponseDecoder,
};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::config::{FlushInfo, Hooks, IndexerConfig};
use crate::decoder::JsonResponseDecoder;
use crate::encoder::NdjsonEncoder;
use crate::error::IndexerError;
use crate::flushers::HttpFlusher;
use crate::stats::{IndexerStats, StatsSnapshot};
use crate::worker::{Worker, WorkerShared};

/// Builder for creating a BulkIndexer
pub struct BulkIndexerBuilder<F> {
    flusher: F,
    config: IndexerConfig,
    encoder: Arc<dyn Encoder>,
    decoder: Arc<dyn ResponseDecoder>,
    hooks: Hooks,
}

impl BulkIndexerBuilder<HttpFlusher> {
    /// Builder wired to the HTTP flusher described by `settings`
    pub fn from_settings(settings: &IndexerSettings) -> Result<Self, ContractError> {
        let flusher = HttpFlusher::from_settings(&settings.http)?;
        Ok(Self::new(flusher).config(IndexerConfig::from(settings)))
    }
}

impl<F> BulkIndexerBuilder<F>
where
    F: Flusher + Sync + 'static,
{
    /// Create a builder with default encoder, decoder and config
    pub fn new(flusher: F) -> Self {
        Self {
            flusher,
            config: IndexerConfig::default(),
            encoder: Arc::new(NdjsonEncoder),
            decoder: Arc::new(JsonResponseDecoder),
            hooks: Hooks::default(),
        }
    }

    /// Replace the whole batching configuration
    pub fn config(mut self, config: IndexerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn workers(mut self, workers: usize) -> Self {
        self.config.num_workers = workers;
        self
    }

    pub fn flush_bytes(mut self, bytes: usize) -> Self {
        self.config.flush_bytes = bytes;
        self
    }

    /// Periodic flush interval; zero disables it
    pub fn flush_interval(mut self, interval: Duration) -> Self {
        self.config.flush_interval = Some(interval);
        self
    }

    pub fn index(mut self, index: impl Into<String>) -> Self {
        self.config.index = Some(index.into());
        self
    }

    pub fn params(mut self, params: RequestParams) -> Self {
        self.config.params = params;
        self
    }

    pub fn encoder(mut self, encoder: impl Encoder + 'static) -> Self {
        self.encoder = Arc::new(encoder);
        self
    }

    pub fn decoder(mut self, decoder: impl ResponseDecoder + 'static) -> Self {
        self.decoder = Arc::new(decoder);
        self
    }

    /// Called whenever a whole batch fails at the transport or protocol level
    pub fn on_error<C>(mut self, callback: C) -> Self
    where
        C: Fn(&IndexerError) + Send + Sync + 'static,
    {
        self.hooks.on_error = Some(Arc::new(callback));
        self
    }

    pub fn on_flush_start<C>(mut self, callback: C) -> Self
    where
        C: Fn(&FlushInfo) + Send + Sync + 'static,
    {
        self.hooks.on_flush_start = Some(Arc::new(callback));
        self
    }

    pub fn on_flush_end<C>(mut self, callback: C) -> Self
    where
        C: Fn(&FlushInfo) + Send + Sync + 'static,
    {
        self.hooks.on_flush_end = Some(Arc::new(callback));
        self
    }

    /// Build and start the indexer
    ///
    /// Spawns one task per worker, so it must be called inside a tokio runtime.
    #[instrument(name = "bulk_indexer_build", skip(self))]
    pub fn build(self) -> BulkIndexer {
        let config = self.config.normalized();
        let num_workers = config.num_workers;
        let (tx, rx) = async_channel::bounded(config.queue_capacity());
        let stats = Arc::new(IndexerStats::new());
        let closing = CancellationToken::new();

        info!(
            workers = num_workers,
            flush_bytes = config.flush_bytes,
            flush_interval = ?config.flush_interval,
            index = ?config.index,
            "Starting bulk indexer"
        );

        let shared = Arc::new(WorkerShared {
            flusher: self.flusher,
            encoder: self.encoder,
            decoder: self.decoder,
            stats: Arc::clone(&stats),
            hooks: self.hooks,
            config,
            closing: closing.clone(),
        });

        let workers = (0..num_workers)
            .map(|id| {
                let worker = Worker::new(id, rx.clone(), Arc::clone(&shared));
                tokio::spawn(worker.run())
            })
            .collect();

        BulkIndexer {
            tx,
            stats,
            closing,
            closed: AtomicBool::new(false),
            workers: Mutex::new(workers),
            num_workers,
        }
    }
}

/// Concurrent bulk indexer
///
/// Items go through one bounded queue (capacity = worker count) to a fixed
/// pool of workers. Each worker batches what it receives and flushes on size,
/// on its interval timer, or on close.
pub struct BulkIndexer {
    tx: async_channel::Sender<Item>,
    stats: Arc<IndexerStats>,
    closing: CancellationToken,
    closed: AtomicBool,
    workers: Mutex<Vec<JoinHandle<Option<IndexerError>>>>,
    num_workers: usize,
}

impl BulkIndexer {
    /// Shorthand for [`BulkIndexerBuilder::new`]
    pub fn builder<F>(flusher: F) -> BulkIndexerBuilder<F>
    where
        F: Flusher + Sync + 'static,
    {
        BulkIndexerBuilder::new(flusher)
    }

    pub fn num_workers(&self) -> usize {
        self.num_workers
    }

    /// Enqueue one item
    ///
    /// Waits for queue space when all workers are busy. Returns `Cancelled`
    /// if `cancel` has fired or fires first, in which case the item is not
    /// counted.
    pub async fn add(&self, item: Item, cancel: &CancellationToken) -> Result<(), IndexerError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(IndexerError::Closed);
        }
        item.validate().map_err(IndexerError::InvalidItem)?;
        if cancel.is_cancelled() {
            return Err(IndexerError::Cancelled);
        }

        match self.tx.try_send(item) {
            Ok(()) => {}
            Err(TrySendError::Closed(_)) => return Err(IndexerError::Closed),
            Err(TrySendError::Full(item)) => {
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => return Err(IndexerError::Cancelled),
                    sent = self.tx.send(item) => {
                        sent.map_err(|_| IndexerError::Closed)?;
                    }
                }
            }
        }

        self.stats.inc_added();
        observability::record_item_added();
        Ok(())
    }

    /// Stop accepting items and wait for every worker to drain
    ///
    /// Returns the first batch failure seen while draining. If `cancel` fires
    /// first, returns `Cancelled` and leaves the workers finishing in the
    /// background.
    #[instrument(name = "bulk_indexer_close", skip_all, fields(workers = self.num_workers))]
    pub async fn close(&self, cancel: &CancellationToken) -> Result<(), IndexerError> {
        if self.closed.swap(true, Ordering::AcqRel) {
            return Err(IndexerError::Closed);
        }
        self.closing.cancel();
        self.tx.close();

        let handles = std::mem::take(
            &mut *self
                .workers
                .lock()
                .unwrap_or_else(PoisonError::into_inner),
        );

        let drain = async move {
            let mut first_error = None;
            for (worker, handle) in handles.into_iter().enumerate() {
                let outcome = match handle.await {
                    Ok(outcome) => outcome,
                    Err(e) => Some(IndexerError::Worker {
                        worker,
                        message: e.to_string(),
                    }),
                };
                if first_error.is_none() {
                    first_error = outcome;
                }
            }
            first_error
        };

        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                warn!("Close cancelled, workers keep draining in the background");
                return Err(IndexerError::Cancelled);
            }
            first_error = drain => first_error,
        };

        let stats = self.stats.snapshot();
        debug!(
            added = stats.num_added,
            flushed = stats.num_flushed,
            failed = stats.num_failed,
            requests = stats.num_requests,
            "Bulk indexer closed"
        );

        match result {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Current statistics (non-blocking)
    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }
}
