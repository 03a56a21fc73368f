//! Strategy traits the indexer is assembled from
//!
//! Each trait has exactly one method so that any piece of the flush path can
//! be swapped at construction time.

use bytes::Bytes;

use crate::{BulkRequest, ContractError, Item, ResultRecord};

/// Encoded wire representation of a single item
///
/// Always ends with a newline; `len()` is the exact number of bytes the
/// fragment contributes to a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment(Bytes);

impl Fragment {
    pub fn new(bytes: impl Into<Bytes>) -> Self {
        Self(bytes.into())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

/// Item -> wire fragment
pub trait Encoder: Send + Sync {
    /// Encode one item
    ///
    /// # Errors
    /// Returns an encode error if the item cannot be framed
    fn encode(&self, item: &Item) -> Result<Fragment, ContractError>;
}

/// Response body -> ordered result records
pub trait ResponseDecoder: Send + Sync {
    /// Decode a complete bulk response body, preserving item order
    ///
    /// # Errors
    /// Returns a decode error on malformed bodies
    fn decode(&self, body: &[u8]) -> Result<Vec<ResultRecord>, ContractError>;
}

/// Transport seam: performs one bulk call
///
/// Implementations own their retry/backoff policy. Any error returned here is
/// a transport-level failure: the batch outcome is unknown.
#[trait_variant::make(Flusher: Send)]
pub trait LocalFlusher {
    /// Send the batch and return the raw response body
    async fn flush(&self, request: BulkRequest) -> Result<Bytes, ContractError>;
}
