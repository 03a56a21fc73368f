//! Indexer error types

use contracts::ContractError;
use thiserror::Error;

/// Indexer-specific errors
#[derive(Debug, Error)]
pub enum IndexerError {
    /// The caller's cancellation token fired before the operation completed
    #[error("operation cancelled")]
    Cancelled,

    /// `add` after `close`, or a second `close`
    #[error("bulk indexer is closed")]
    Closed,

    /// Item rejected before it was enqueued
    #[error("invalid item: {0}")]
    InvalidItem(#[source] ContractError),

    /// Response could not be matched to the batch it answers
    #[error("protocol violation: {message}")]
    Protocol { message: String },

    /// Flusher returned no usable response
    #[error("flush failed: {0}")]
    Transport(#[source] ContractError),

    /// Worker task ended abnormally
    #[error("worker {worker} failed: {message}")]
    Worker { worker: usize, message: String },
}

impl IndexerError {
    /// Create a protocol error
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol {
            message: message.into(),
        }
    }
}
