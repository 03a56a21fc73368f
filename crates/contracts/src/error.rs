//! Layered error definitions
//!
//! Categorized by source: config / encode / decode / transport / item

use thiserror::Error;

/// Unified error type
#[derive(Debug, Error)]
pub enum ContractError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== Wire Errors =====
    /// Item could not be turned into a bulk fragment
    #[error("encode error for {action} item: {message}")]
    Encode { action: String, message: String },

    /// Response body could not be parsed
    #[error("decode error: {message}")]
    Decode { message: String },

    // ===== Transport Errors =====
    /// Bulk request did not produce a usable response body
    #[error("transport error: {message}")]
    Transport {
        message: String,
        /// HTTP status, when the service answered at all
        status: Option<u16>,
    },

    // ===== Item Errors =====
    /// A single operation was rejected by the service
    #[error("{action} failed with status {status}: [{kind}] {reason}")]
    ItemFailed {
        action: String,
        status: u16,
        kind: String,
        reason: String,
    },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl ContractError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create encode error
    pub fn encode(action: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Encode {
            action: action.into(),
            message: message.into(),
        }
    }

    /// Create decode error
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Create transport error without a status
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
            status: None,
        }
    }

    /// Create transport error for an HTTP status the body could not explain
    pub fn transport_status(status: u16, message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
            status: Some(status),
        }
    }
}
