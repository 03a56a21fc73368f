//! FnFlusher - closure-backed transport

use std::future::Future;

use bytes::Bytes;
use contracts::{BulkRequest, ContractError, Flusher};

/// Flusher that delegates every bulk call to a closure
///
/// Useful for in-process transports and for scripting responses in tests.
#[derive(Clone)]
pub struct FnFlusher<F>(F);

/// Wrap a closure returning a future as a [`Flusher`]
pub fn flush_fn<F, Fut>(f: F) -> FnFlusher<F>
where
    F: Fn(BulkRequest) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Bytes, ContractError>> + Send,
{
    FnFlusher(f)
}

impl<F, Fut> Flusher for FnFlusher<F>
where
    F: Fn(BulkRequest) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Bytes, ContractError>> + Send,
{
    fn flush(
        &self,
        request: BulkRequest,
    ) -> impl Future<Output = Result<Bytes, ContractError>> + Send {
        (self.0)(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::RequestParams;

    #[tokio::test]
    async fn test_closure_receives_request() {
        let flusher = flush_fn(|request: BulkRequest| async move {
            assert_eq!(request.item_count, 1);
            Ok(Bytes::from(format!("{}", request.body.len())))
        });

        let response = flusher
            .flush(BulkRequest {
                index: None,
                body: Bytes::from_static(b"{\"delete\":{\"_id\":\"1\"}}\n"),
                item_count: 1,
                params: RequestParams::default(),
            })
            .await
            .unwrap();
        assert_eq!(&response[..], b"23");
    }
}
