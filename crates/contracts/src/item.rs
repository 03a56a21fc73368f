//! Item - a single bulk operation submitted to the indexer

use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::{Action, ContractError, ResultRecord};

/// Called once when the service reports the operation as successful
pub type SuccessCallback = Arc<dyn Fn(&Item, &ResultRecord) + Send + Sync>;

/// Called once when the service rejects the operation
pub type FailureCallback = Arc<dyn Fn(&Item, &ResultRecord, &ContractError) + Send + Sync>;

/// Version check semantics for `version`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VersionType {
    Internal,
    External,
    ExternalGte,
}

/// One document operation
///
/// Items are immutable once handed to the indexer. The source payload is
/// opaque: it is written to the wire exactly as given.
#[derive(Clone)]
pub struct Item {
    /// Operation kind
    pub action: Action,
    /// Target document id (server-assigned when absent for create/index)
    pub document_id: Option<String>,
    /// Target index, overriding the indexer default
    pub index: Option<String>,
    /// Shard routing value
    pub routing: Option<String>,
    pub version: Option<i64>,
    pub version_type: Option<VersionType>,
    /// Optimistic concurrency control
    pub if_seq_no: Option<i64>,
    pub if_primary_term: Option<i64>,
    /// Update only: retries the service performs on version conflict
    pub retry_on_conflict: Option<u32>,
    pub require_alias: bool,
    /// Source payload (required unless the action is `delete`)
    pub body: Option<Bytes>,
    pub on_success: Option<SuccessCallback>,
    pub on_failure: Option<FailureCallback>,
}

impl Item {
    /// Create an item with no addressing and no payload
    pub fn new(action: Action) -> Self {
        Self {
            action,
            document_id: None,
            index: None,
            routing: None,
            version: None,
            version_type: None,
            if_seq_no: None,
            if_primary_term: None,
            retry_on_conflict: None,
            require_alias: false,
            body: None,
            on_success: None,
            on_failure: None,
        }
    }

    /// `index` operation with the given source
    pub fn index(body: impl Into<Bytes>) -> Self {
        Self::new(Action::Index).with_body(body)
    }

    /// `create` operation with the given source
    pub fn create(body: impl Into<Bytes>) -> Self {
        Self::new(Action::Create).with_body(body)
    }

    /// `update` operation; the body is the update request (`{"doc": ..}`)
    pub fn update(id: impl Into<String>, body: impl Into<Bytes>) -> Self {
        Self::new(Action::Update).with_id(id).with_body(body)
    }

    /// `delete` operation for the given id
    pub fn delete(id: impl Into<String>) -> Self {
        Self::new(Action::Delete).with_id(id)
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.document_id = Some(id.into());
        self
    }

    pub fn with_index(mut self, index: impl Into<String>) -> Self {
        self.index = Some(index.into());
        self
    }

    pub fn with_routing(mut self, routing: impl Into<String>) -> Self {
        self.routing = Some(routing.into());
        self
    }

    pub fn with_version(mut self, version: i64, version_type: Option<VersionType>) -> Self {
        self.version = Some(version);
        self.version_type = version_type;
        self
    }

    pub fn with_seq_no(mut self, seq_no: i64, primary_term: i64) -> Self {
        self.if_seq_no = Some(seq_no);
        self.if_primary_term = Some(primary_term);
        self
    }

    pub fn with_retry_on_conflict(mut self, retries: u32) -> Self {
        self.retry_on_conflict = Some(retries);
        self
    }

    pub fn with_require_alias(mut self, require_alias: bool) -> Self {
        self.require_alias = require_alias;
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Register the success callback
    pub fn on_success<F>(mut self, callback: F) -> Self
    where
        F: Fn(&Item, &ResultRecord) + Send + Sync + 'static,
    {
        self.on_success = Some(Arc::new(callback));
        self
    }

    /// Register the failure callback
    pub fn on_failure<F>(mut self, callback: F) -> Self
    where
        F: Fn(&Item, &ResultRecord, &ContractError) + Send + Sync + 'static,
    {
        self.on_failure = Some(Arc::new(callback));
        self
    }

    /// Check that the action and payload agree
    ///
    /// # Errors
    /// Returns an encode error when a create/index/update item has no source.
    pub fn validate(&self) -> Result<(), ContractError> {
        if self.action.requires_source() && self.body.is_none() {
            return Err(ContractError::encode(
                self.action.as_str(),
                "source payload is required",
            ));
        }
        Ok(())
    }
}

impl fmt::Debug for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Item")
            .field("action", &self.action)
            .field("document_id", &self.document_id)
            .field("index", &self.index)
            .field("routing", &self.routing)
            .field("body_len", &self.body.as_ref().map(Bytes::len))
            .field("on_success", &self.on_success.is_some())
            .field("on_failure", &self.on_failure.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_requires_source() {
        assert!(Item::new(Action::Index).validate().is_err());
        assert!(Item::new(Action::Update).with_id("1").validate().is_err());
        assert!(Item::index(r#"{"a":1}"#).validate().is_ok());
        assert!(Item::delete("1").validate().is_ok());
    }

    #[test]
    fn test_builder_sets_addressing() {
        let item = Item::create(r#"{"title":"x"}"#)
            .with_id("42")
            .with_index("books")
            .with_routing("r1")
            .with_version(3, Some(VersionType::External));

        assert_eq!(item.action, Action::Create);
        assert_eq!(item.document_id.as_deref(), Some("42"));
        assert_eq!(item.index.as_deref(), Some("books"));
        assert_eq!(item.routing.as_deref(), Some("r1"));
        assert_eq!(item.version, Some(3));
        assert_eq!(item.version_type, Some(VersionType::External));
    }

    #[test]
    fn test_debug_hides_callbacks() {
        let item = Item::delete("7").on_success(|_, _| {});
        let rendered = format!("{item:?}");
        assert!(rendered.contains("on_success: true"));
        assert!(rendered.contains("on_failure: false"));
    }
}
