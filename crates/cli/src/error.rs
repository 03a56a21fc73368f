//! Error types for CLI operations.

use indexer::IndexerError;
use thiserror::Error;

/// CLI-specific error types
#[derive(Error, Debug)]
pub enum CliError {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: String },

    /// Input line that cannot become a bulk item
    #[error("Invalid input at line {line}: {message}")]
    InvalidInput { line: usize, message: String },

    /// Indexer rejected an item or failed to close cleanly
    #[error("Indexer error: {0}")]
    Indexer(#[from] IndexerError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub fn config_not_found(path: impl Into<String>) -> Self {
        Self::ConfigNotFound { path: path.into() }
    }

    pub fn invalid_input(line: usize, message: impl Into<String>) -> Self {
        Self::InvalidInput {
            line,
            message: message.into(),
        }
    }
}

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;
