//! ResultRecord - per-operation outcome decoded from a bulk response

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{Action, ContractError};

/// Statuses at or above this value are client/server errors
pub const ERROR_STATUS_THRESHOLD: u16 = 400;

/// Error descriptor attached to a failed operation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Error class, e.g. `version_conflict_engine_exception`
    #[serde(rename = "type", default)]
    pub kind: String,

    #[serde(default)]
    pub reason: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caused_by: Option<Box<ErrorDetail>>,
}

impl ErrorDetail {
    pub fn new(kind: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            reason: reason.into(),
            caused_by: None,
        }
    }
}

impl fmt::Display for ErrorDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.reason)?;
        if let Some(cause) = &self.caused_by {
            write!(f, " (caused by {cause})")?;
        }
        Ok(())
    }
}

/// Outcome of one operation within a flushed batch
///
/// Produced per flush and handed to the item callbacks; never retained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultRecord {
    /// Action key the service answered under
    pub action: Action,
    pub index: Option<String>,
    pub document_id: Option<String>,
    pub version: Option<i64>,
    /// Outcome tag, e.g. `created`, `updated`, `deleted`, `not_found`, `noop`
    pub result: Option<String>,
    /// HTTP-like status; 0 when the service omitted it
    pub status: u16,
    pub seq_no: Option<i64>,
    pub primary_term: Option<i64>,
    pub error: Option<ErrorDetail>,
}

impl ResultRecord {
    /// Bare record with no status (treated as success)
    pub fn new(action: Action) -> Self {
        Self {
            action,
            index: None,
            document_id: None,
            version: None,
            result: None,
            status: 0,
            seq_no: None,
            primary_term: None,
            error: None,
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    pub fn with_result(mut self, result: impl Into<String>) -> Self {
        self.result = Some(result.into());
        self
    }

    pub fn with_error(mut self, error: ErrorDetail) -> Self {
        self.error = Some(error);
        self
    }

    /// No error descriptor and a status that is absent or below 400
    pub fn is_success(&self) -> bool {
        self.error.is_none() && self.status < ERROR_STATUS_THRESHOLD
    }

    /// Whether the service classified the outcome as a fresh document
    pub fn is_created(&self) -> bool {
        self.result.as_deref() == Some("created")
    }

    /// Error value handed to the failure callback
    pub fn to_error(&self) -> ContractError {
        let (kind, reason) = match &self.error {
            Some(detail) => (detail.kind.clone(), detail.to_string()),
            None => (
                "http_status".to_string(),
                format!("operation returned status {}", self.status),
            ),
        };
        ContractError::ItemFailed {
            action: self.action.as_str().to_string(),
            status: self.status,
            kind,
            reason,
        }
    }
}
