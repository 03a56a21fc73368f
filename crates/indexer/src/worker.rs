//! Worker task: owns one buffer and one flush timer

use std::future::pending;
use std::sync::Arc;
use std::time::Instant;

use contracts::{
    BulkRequest, ContractError, Encoder, ErrorDetail, Flusher, Item, ResponseDecoder,
    ResultRecord,
};
use tokio::time::{interval_at, Interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, warn};

use crate::buffer::{Batch, Buffer};
use crate::config::{FlushInfo, FlushTrigger, Hooks, IndexerConfig};
use crate::error::IndexerError;
use crate::stats::IndexerStats;

/// State shared read-only by every worker of one indexer
pub(crate) struct WorkerShared<F> {
    pub flusher: F,
    pub encoder: Arc<dyn Encoder>,
    pub decoder: Arc<dyn ResponseDecoder>,
    pub stats: Arc<IndexerStats>,
    pub hooks: Hooks,
    pub config: IndexerConfig,
    /// Cancelled once `close` has been requested
    pub closing: CancellationToken,
}

pub(crate) struct Worker<F> {
    id: usize,
    rx: async_channel::Receiver<Item>,
    shared: Arc<WorkerShared<F>>,
    buffer: Buffer,
    ticker: Option<Interval>,
    drain_error: Option<IndexerError>,
}

/// Resolves on the next tick, or never when the timer is disabled
async fn tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(ticker) => {
            ticker.tick().await;
        }
        None => pending::<()>().await,
    }
}

impl<F> Worker<F>
where
    F: Flusher + Sync + 'static,
{
    pub fn new(id: usize, rx: async_channel::Receiver<Item>, shared: Arc<WorkerShared<F>>) -> Self {
        let ticker = shared.config.flush_interval.map(|period| {
            let mut ticker = interval_at(tokio::time::Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ticker
        });

        Self {
            id,
            rx,
            shared,
            buffer: Buffer::new(),
            ticker,
            drain_error: None,
        }
    }

    /// Consume the queue until it is closed and drained
    ///
    /// Returns the first batch failure seen after close was requested.
    #[instrument(name = "bulk_worker_loop", skip(self), fields(worker = self.id))]
    pub async fn run(mut self) -> Option<IndexerError> {
        debug!("Worker started");

        loop {
            tokio::select! {
                received = self.rx.recv() => match received {
                    Ok(item) => self.accept(item).await,
                    Err(_) => break,
                },
                _ = tick(&mut self.ticker) => {
                    if !self.buffer.is_empty() {
                        self.flush(FlushTrigger::Interval).await;
                    }
                }
            }
        }

        if !self.buffer.is_empty() {
            self.flush(FlushTrigger::Shutdown).await;
        }

        debug!("Worker stopped");
        self.drain_error
    }

    async fn accept(&mut self, item: Item) {
        let fragment = match self.shared.encoder.encode(&item) {
            Ok(fragment) => fragment,
            Err(e) => {
                self.reject(&item, e);
                return;
            }
        };

        self.buffer.push(fragment, item);
        if self.buffer.byte_len() >= self.shared.config.flush_bytes {
            self.flush(FlushTrigger::Size).await;
        }
    }

    /// Resolve an item the encoder refused, without sending it
    fn reject(&self, item: &Item, error: ContractError) {
        warn!(action = %item.action, error = %error, "Item could not be encoded");
        let record = ResultRecord::new(item.action)
            .with_error(ErrorDetail::new("encode_error", error.to_string()));
        self.resolve(item, &record);
    }

    #[instrument(
        name = "bulk_flush",
        skip(self),
        fields(worker = self.id, items = self.buffer.len(), bytes = self.buffer.byte_len())
    )]
    async fn flush(&mut self, trigger: FlushTrigger) {
        let info = FlushInfo {
            worker: self.id,
            items: self.buffer.len(),
            bytes: self.buffer.byte_len(),
            trigger,
        };
        let batch = self.buffer.take();

        if let Some(hook) = &self.shared.hooks.on_flush_start {
            hook(&info);
        }

        let started = Instant::now();
        let outcome = self.send(batch).await;
        observability::record_flush(
            trigger.as_str(),
            info.items,
            info.bytes,
            started.elapsed().as_secs_f64() * 1000.0,
        );

        if let Err(e) = outcome {
            self.batch_failed(e);
        }

        if let Some(hook) = &self.shared.hooks.on_flush_end {
            hook(&info);
        }
    }

    /// Send one batch and dispatch its per-item results
    async fn send(&self, batch: Batch) -> Result<(), IndexerError> {
        let Batch { body, items } = batch;
        let request = BulkRequest {
            index: self.shared.config.index.clone(),
            body,
            item_count: items.len(),
            params: self.shared.config.params.clone(),
        };

        let response = self
            .shared
            .flusher
            .flush(request)
            .await
            .map_err(IndexerError::Transport)?;
        self.shared.stats.inc_requests();

        let records = self
            .shared
            .decoder
            .decode(&response)
            .map_err(|e| IndexerError::protocol(e.to_string()))?;

        if records.len() != items.len() {
            return Err(IndexerError::protocol(format!(
                "response has {} records for {} items",
                records.len(),
                items.len()
            )));
        }

        for (item, record) in items.iter().zip(&records) {
            self.resolve(item, record);
        }
        debug!(items = items.len(), "Batch resolved");
        Ok(())
    }

    /// Count one item outcome and fire its callback
    fn resolve(&self, item: &Item, record: &ResultRecord) {
        let success = record.is_success();
        observability::record_item_outcome(item.action.as_str(), success);

        if success {
            self.shared
                .stats
                .record_success(item.action, record.is_created());
            if let Some(callback) = &item.on_success {
                callback(item, record);
            }
        } else {
            self.shared.stats.inc_failed();
            if let Some(callback) = &item.on_failure {
                callback(item, record, &record.to_error());
            }
        }
    }

    fn batch_failed(&mut self, error: IndexerError) {
        warn!(worker = self.id, error = %error, "Batch outcome unknown");
        observability::record_transport_error(match &error {
            IndexerError::Protocol { .. } => "protocol",
            _ => "transport",
        });

        if let Some(callback) = &self.shared.hooks.on_error {
            callback(&error);
        }
        if self.shared.closing.is_cancelled() && self.drain_error.is_none() {
            self.drain_error = Some(error);
        }
    }
}
