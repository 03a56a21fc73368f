//! # Integration Tests
//!
//! 集成测试与端到端测试。
//!
//! 负责：
//! - 配置 -> indexer 的装配测试
//! - 基于内存 bulk 服务的 e2e 测试（无需真实集群）

/// In-memory bulk service used by the end-to-end tests
#[cfg(test)]
mod fake {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use bytes::Bytes;
    use contracts::{BulkRequest, ContractError, Flusher};
    use serde_json::{json, Value};

    #[derive(Default)]
    pub struct FakeCluster {
        pub docs: Mutex<HashMap<String, String>>,
        pub requests: Mutex<Vec<BulkRequest>>,
        next_id: Mutex<u64>,
    }

    impl FakeCluster {
        fn apply(&self, action: &str, meta: &Value, source: Option<&str>) -> Value {
            let mut docs = self.docs.lock().unwrap();
            let id = match meta.get("_id").and_then(Value::as_str) {
                Some(id) => id.to_string(),
                None => {
                    let mut next = self.next_id.lock().unwrap();
                    *next += 1;
                    format!("auto-{next}")
                }
            };
            let exists = docs.contains_key(&id);

            let (status, result, error) = match (action, exists) {
                ("create", true) => (409, None, Some(("version_conflict_engine_exception", "document already exists"))),
                ("update", false) => (404, None, Some(("document_missing_exception", "document missing"))),
                ("delete", false) => (404, Some("not_found"), None),
                ("delete", true) => {
                    docs.remove(&id);
                    (200, Some("deleted"), None)
                }
                (_, exists) => {
                    docs.insert(id.clone(), source.unwrap_or_default().to_string());
                    if exists {
                        (200, Some("updated"), None)
                    } else {
                        (201, Some("created"), None)
                    }
                }
            };

            let mut record = json!({ "_id": id, "status": status });
            if let Some(result) = result {
                record["result"] = json!(result);
            }
            if let Some((kind, reason)) = error {
                record["error"] = json!({ "type": kind, "reason": reason });
            }
            let mut item = serde_json::Map::new();
            item.insert(action.to_string(), record);
            Value::Object(item)
        }

        pub fn handle(&self, request: BulkRequest) -> Result<Bytes, ContractError> {
            let body = std::str::from_utf8(&request.body)
                .map_err(|e| ContractError::transport(e.to_string()))?;
            let mut lines = body.lines();
            let mut items = Vec::new();

            while let Some(line) = lines.next() {
                let meta: Value = serde_json::from_str(line)
                    .map_err(|e| ContractError::transport(format!("bad metadata line: {e}")))?;
                let (action, meta) = meta
                    .as_object()
                    .and_then(|o| o.iter().next())
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .ok_or_else(|| ContractError::transport("empty metadata line"))?;
                let source = if action == "delete" {
                    None
                } else {
                    let line = lines
                        .next()
                        .ok_or_else(|| ContractError::transport("missing source line"))?;
                    serde_json::from_str::<Value>(line)
                        .map_err(|e| ContractError::transport(format!("bad source line: {e}")))?;
                    Some(line)
                };
                items.push(self.apply(&action, &meta, source));
            }

            if items.len() != request.item_count {
                return Err(ContractError::transport("item count does not match body"));
            }
            self.requests.lock().unwrap().push(request);
            Ok(Bytes::from(
                json!({ "took": 1, "errors": false, "items": items }).to_string(),
            ))
        }
    }

    #[derive(Clone, Default)]
    pub struct FakeFlusher(pub Arc<FakeCluster>);

    impl Flusher for FakeFlusher {
        async fn flush(&self, request: BulkRequest) -> Result<Bytes, ContractError> {
            self.0.handle(request)
        }
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use bytes::Bytes;
    use config_loader::{ConfigFormat, ConfigLoader};
    use contracts::{BulkRequest, ContractError, Item, Refresh, ResultRecord};
    use indexer::{flush_fn, BulkIndexer, IndexerConfig, IndexerError};
    use tokio_util::sync::CancellationToken;

    use crate::fake::FakeFlusher;

    const SETTINGS: &str = r#"
        workers = 2
        flush_bytes = 256
        index = "books"

        [request]
        refresh = "wait_for"
        pipeline = "enrich"

        [http]
        url = "http://localhost:9200"
    "#;

    /// End-to-end test: settings file -> BulkIndexer -> in-memory service
    #[tokio::test]
    async fn test_e2e_settings_to_service() {
        let settings = ConfigLoader::load_from_str(SETTINGS, ConfigFormat::Toml).unwrap();
        let config = IndexerConfig::from(&settings);
        assert_eq!(config.num_workers, 2);

        let flusher = FakeFlusher::default();
        let cluster = Arc::clone(&flusher.0);
        let indexer = BulkIndexer::builder(flusher).config(config).build();

        let cancel = CancellationToken::new();
        for i in 0..50 {
            let doc = format!(r#"{{"title":"book {i}","pages":{}}}"#, 100 + i);
            indexer
                .add(Item::index(doc).with_id(format!("b{i}")), &cancel)
                .await
                .unwrap();
        }
        indexer.close(&cancel).await.unwrap();

        let stats = indexer.stats();
        assert_eq!(stats.num_added, 50);
        assert_eq!(stats.num_created, 50);
        assert_eq!(stats.num_failed, 0);
        assert_eq!(stats.num_unresolved(), 0);
        assert_eq!(cluster.docs.lock().unwrap().len(), 50);

        let requests = cluster.requests.lock().unwrap();
        assert_eq!(stats.num_requests, requests.len() as u64);
        assert!(requests.len() > 1);
        for request in requests.iter() {
            assert_eq!(request.index.as_deref(), Some("books"));
            assert_eq!(request.params.refresh, Some(Refresh::WaitFor));
            assert_eq!(request.params.pipeline.as_deref(), Some("enrich"));
            assert!(request.body.ends_with(b"\n"));
        }
    }

    /// Record k resolves item k, across mixed outcomes
    #[tokio::test]
    async fn test_e2e_positional_correlation() {
        let flusher = FakeFlusher::default();
        let indexer = BulkIndexer::builder(flusher.clone())
            .workers(1)
            .flush_bytes(1 << 20)
            .build();

        let outcomes = Arc::new(Mutex::new(Vec::new()));
        let cancel = CancellationToken::new();
        let items = vec![
            ("create a", Item::create(r#"{"v":1}"#).with_id("a")),
            ("create a again", Item::create(r#"{"v":2}"#).with_id("a")),
            ("delete b", Item::delete("b")),
            ("update a", Item::update("a", r#"{"v":3}"#)),
            ("index c", Item::index(r#"{"v":4}"#).with_id("c")),
            ("delete c", Item::delete("c")),
            ("update z", Item::update("z", r#"{"v":5}"#)),
        ];

        for (label, item) in items {
            let ok = Arc::clone(&outcomes);
            let err = Arc::clone(&outcomes);
            let item = item
                .on_success(move |_: &Item, record: &ResultRecord| {
                    ok.lock().unwrap().push(format!("{label}: {}", record.status));
                })
                .on_failure(move |_: &Item, record: &ResultRecord, e: &ContractError| {
                    assert!(matches!(e, ContractError::ItemFailed { .. }));
                    err.lock()
                        .unwrap()
                        .push(format!("{label}: failed {}", record.status));
                });
            indexer.add(item, &cancel).await.unwrap();
        }
        indexer.close(&cancel).await.unwrap();

        assert_eq!(
            *outcomes.lock().unwrap(),
            vec![
                "create a: 201",
                "create a again: failed 409",
                "delete b: failed 404",
                "update a: 200",
                "index c: 201",
                "delete c: 200",
                "update z: failed 404",
            ]
        );

        let stats = indexer.stats();
        assert_eq!(stats.num_requests, 1);
        assert_eq!(stats.num_flushed, 4);
        assert_eq!(stats.num_failed, 3);
        assert_eq!(stats.num_created, 2);
        assert_eq!(stats.num_updated, 1);
        assert_eq!(stats.num_deleted, 1);
    }

    /// A service that never answers leaves every item unresolved
    #[tokio::test]
    async fn test_e2e_transport_failure() {
        let errors = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&errors);

        let indexer = BulkIndexer::builder(flush_fn(|_request: BulkRequest| async {
            Err::<Bytes, _>(ContractError::transport_status(503, "unavailable"))
        }))
        .workers(1)
        .flush_bytes(64)
        .on_error(move |_: &IndexerError| {
            seen.fetch_add(1, Ordering::SeqCst);
        })
        .build();

        let cancel = CancellationToken::new();
        for i in 0..4 {
            indexer
                .add(Item::delete(format!("doc-{i}")), &cancel)
                .await
                .unwrap();
        }
        let closed = indexer.close(&cancel).await;

        // Three deletes (27 bytes each) reach 64: one size flush, one on close
        assert_eq!(errors.load(Ordering::SeqCst), 2);
        assert!(matches!(closed, Err(IndexerError::Transport(_))));

        let stats = indexer.stats();
        assert_eq!(stats.num_added, 4);
        assert_eq!(stats.num_flushed + stats.num_failed, 0);
        assert_eq!(stats.num_unresolved(), 4);
    }

    /// Invalid settings never reach the indexer
    #[test]
    fn test_invalid_settings_rejected() {
        let bad = SETTINGS.replace("http://localhost:9200", "ftp://localhost");
        assert!(ConfigLoader::load_from_str(&bad, ConfigFormat::Toml).is_err());
    }
}
