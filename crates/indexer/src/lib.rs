//! # Indexer
//!
//! 批量写入模块。
//!
//! 负责：
//! - 通过有界队列接收 `Item`（队列满时反压调用方）
//! - 每个 worker 独立缓冲，按字节阈值 / 定时器 / 关闭时 flush
//! - 按位置把响应记录对应回每个 item，触发其回调
//!
//! ```ignore
//! let indexer = BulkIndexer::builder(HttpFlusher::new("http://localhost:9200")?)
//!     .workers(4)
//!     .flush_interval(Duration::from_secs(1))
//!     .build();
//!
//! indexer.add(Item::index(doc).with_id("1"), &cancel).await?;
//! indexer.close(&cancel).await?;
//! println!("{}", indexer.stats());
//! ```

mod buffer;
mod config;
mod decoder;
mod encoder;
mod error;
mod flushers;
mod indexer;
mod stats;
mod worker;

pub use buffer::{Batch, Buffer};
pub use config::{ErrorCallback, FlushHook, FlushInfo, FlushTrigger, IndexerConfig};
pub use decoder::JsonResponseDecoder;
pub use encoder::NdjsonEncoder;
pub use error::IndexerError;
pub use flushers::{flush_fn, FnFlusher, HttpFlusher};
pub use indexer::{BulkIndexer, BulkIndexerBuilder};
pub use stats::{IndexerStats, StatsSnapshot};
