//! `run` command implementation.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use indexer::{BulkIndexerBuilder, FlushInfo, IndexerError};
use observability::FlushAggregator;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::cli::RunArgs;
use crate::error::CliError;
use crate::loader::{feed_file, LineParser, LoadStats};

/// Execute the `run` command
pub async fn run_loader(args: &RunArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration");

    if !args.config.exists() {
        return Err(CliError::config_not_found(args.config.display().to_string()).into());
    }

    let mut settings = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    // Apply CLI overrides
    if let Some(ref url) = args.url {
        info!(url = %url, "Overriding endpoint URL from CLI");
        settings.http.url = url.clone();
    }
    if let Some(ref index) = args.index {
        info!(index = %index, "Overriding default index from CLI");
        settings.index = Some(index.clone());
    }
    if let Some(workers) = args.workers {
        settings.workers = workers;
    }
    config_loader::ConfigLoader::validate(&settings).context("Invalid CLI override")?;

    if args.metrics_port != 0 {
        observability::init_metrics_only(args.metrics_port)?;
    }

    let flushes = Arc::new(Mutex::new(FlushAggregator::new()));
    let flush_log = Arc::clone(&flushes);

    let indexer = BulkIndexerBuilder::from_settings(&settings)
        .context("Failed to create HTTP flusher")?
        .on_error(|e: &IndexerError| error!(error = %e, "Bulk request failed"))
        .on_flush_start(move |info: &FlushInfo| {
            flush_log
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .update(info.trigger.as_str(), info.items, info.bytes);
        })
        .build();

    let parser = LineParser::new(args.action.into(), args.id_field.clone());
    info!(
        input = %args.input.display(),
        action = %parser.action(),
        url = %settings.http.url,
        workers = indexer.num_workers(),
        "Starting load"
    );

    // Ctrl+C stops reading input; a second Ctrl+C (or the timeout) abandons the drain
    let input_cancel = CancellationToken::new();
    let close_cancel = CancellationToken::new();
    tokio::spawn(watch_signals(input_cancel.clone(), close_cancel.clone()));

    let started = Instant::now();
    let fed = feed_file(&indexer, &args.input, &parser, &input_cancel).await;

    let deadline = close_cancel.clone();
    let close_timeout = Duration::from_secs(args.close_timeout);
    tokio::spawn(async move {
        tokio::time::sleep(close_timeout).await;
        deadline.cancel();
    });

    let closed = indexer.close(&close_cancel).await;
    let stats = LoadStats {
        progress: fed.as_ref().copied().unwrap_or_default(),
        indexer: indexer.stats(),
        flushes: flushes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .summary(),
        duration: started.elapsed(),
    };
    stats.print_summary();

    let progress = fed.context("Failed to read input")?;
    match closed {
        Ok(()) => {}
        Err(IndexerError::Cancelled) => {
            warn!(
                unresolved = stats.indexer.num_unresolved(),
                "Close timed out, some batches were still in flight"
            );
        }
        Err(e) => return Err(CliError::from(e)).context("Indexer did not close cleanly"),
    }

    if stats.indexer.num_failed > 0 {
        warn!(failed = stats.indexer.num_failed, "Some documents were rejected");
    }
    info!(
        added = stats.indexer.num_added,
        interrupted = progress.interrupted,
        "Bulk loader finished"
    );
    Ok(())
}

/// First Ctrl+C cancels `input`, the second cancels `close`
async fn watch_signals(input: CancellationToken, close: CancellationToken) {
    for token in [input, close] {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            return;
        }
        warn!("Received Ctrl+C, shutting down");
        token.cancel();
    }
}
