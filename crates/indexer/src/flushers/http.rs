//! HttpFlusher - bulk endpoint over HTTP

use std::time::Duration;

use bytes::Bytes;
use contracts::{BulkRequest, ContractError, Flusher, HttpSettings};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use tracing::{debug, instrument};

const NDJSON: &str = "application/x-ndjson";

/// Flusher that POSTs each batch to `{url}/_bulk`
///
/// Retries and backoff are left to the caller.
#[derive(Debug, Clone)]
pub struct HttpFlusher {
    client: reqwest::Client,
    base_url: String,
}

impl HttpFlusher {
    /// Create a flusher for `base_url` with default client settings
    pub fn new(base_url: impl Into<String>) -> Result<Self, ContractError> {
        Self::with_options(base_url, HeaderMap::new(), Duration::from_secs(30))
    }

    /// Create from file-level settings
    pub fn from_settings(settings: &HttpSettings) -> Result<Self, ContractError> {
        let mut headers = HeaderMap::new();
        for (name, value) in &settings.headers {
            let header = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
                ContractError::config_validation("http.headers", format!("'{name}': {e}"))
            })?;
            let value = HeaderValue::from_str(value).map_err(|e| {
                ContractError::config_validation("http.headers", format!("'{name}': {e}"))
            })?;
            headers.insert(header, value);
        }
        Self::with_options(&settings.url, headers, settings.request_timeout())
    }

    fn with_options(
        base_url: impl Into<String>,
        headers: HeaderMap,
        timeout: Duration,
    ) -> Result<Self, ContractError> {
        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| ContractError::transport(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Endpoint for a request, scoped to its default index when it has one
    pub fn endpoint(&self, index: Option<&str>) -> String {
        match index {
            Some(index) => format!("{}/{}/_bulk", self.base_url, index),
            None => format!("{}/_bulk", self.base_url),
        }
    }
}

impl Flusher for HttpFlusher {
    #[instrument(
        name = "http_flush",
        skip(self, request),
        fields(items = request.item_count, bytes = request.body.len())
    )]
    async fn flush(&self, request: BulkRequest) -> Result<Bytes, ContractError> {
        let url = self.endpoint(request.index.as_deref());

        let response = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, NDJSON)
            .query(&request.params.query_pairs())
            .body(request.body)
            .send()
            .await
            .map_err(|e| ContractError::transport(format!("POST {url}: {e}")))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| ContractError::transport(format!("reading response from {url}: {e}")))?;

        if !status.is_success() {
            let preview = String::from_utf8_lossy(&body[..body.len().min(512)]).into_owned();
            return Err(ContractError::transport_status(status.as_u16(), preview));
        }

        debug!(status = status.as_u16(), bytes = body.len(), "Bulk response received");
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_endpoint() {
        let flusher = HttpFlusher::new("http://localhost:9200/").unwrap();
        assert_eq!(flusher.endpoint(None), "http://localhost:9200/_bulk");
        assert_eq!(
            flusher.endpoint(Some("books")),
            "http://localhost:9200/books/_bulk"
        );
    }

    #[test]
    fn test_invalid_header_rejected() {
        let settings = HttpSettings {
            url: "http://localhost:9200".to_string(),
            headers: HashMap::from([("bad header".to_string(), "x".to_string())]),
            request_timeout_ms: 1000,
        };
        let err = HttpFlusher::from_settings(&settings).unwrap_err();
        assert!(matches!(err, ContractError::ConfigValidation { .. }));
    }

    #[tokio::test]
    async fn test_unreachable_host_is_transport_error() {
        let flusher = HttpFlusher::new("http://127.0.0.1:1").unwrap();
        let err = flusher
            .flush(BulkRequest {
                index: None,
                body: Bytes::from_static(b"{\"delete\":{\"_id\":\"1\"}}\n"),
                item_count: 1,
                params: Default::default(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ContractError::Transport { status: None, .. }));
    }
}
