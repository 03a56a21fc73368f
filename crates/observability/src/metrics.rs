//! Bulk indexer 指标模块
//!
//! `metrics` facade 上的记录函数，以及供命令行汇总使用的内存聚合器。

use std::collections::BTreeMap;
use std::fmt;

use metrics::{counter, histogram};

/// 记录一个被队列接受的 item
pub fn record_item_added() {
    counter!("bulk_indexer_items_added_total").increment(1);
}

/// 记录一次 flush
///
/// `trigger` 为 `size` / `interval` / `shutdown`。
pub fn record_flush(trigger: &'static str, items: usize, bytes: usize, latency_ms: f64) {
    counter!("bulk_indexer_flushes_total", "trigger" => trigger).increment(1);
    histogram!("bulk_indexer_flush_items").record(items as f64);
    histogram!("bulk_indexer_flush_bytes").record(bytes as f64);
    histogram!("bulk_indexer_flush_latency_ms").record(latency_ms);
}

/// 记录单个 item 的最终结果
pub fn record_item_outcome(action: &'static str, success: bool) {
    let outcome = if success { "success" } else { "failure" };
    counter!(
        "bulk_indexer_items_total",
        "action" => action,
        "outcome" => outcome
    )
    .increment(1);
}

/// 记录整批结果未知的失败 (`transport` / `protocol`)
pub fn record_transport_error(kind: &'static str) {
    counter!("bulk_indexer_transport_errors_total", "kind" => kind).increment(1);
}

/// Flush 聚合器
///
/// 在内存中累计每次 flush 的批大小，便于运行结束时输出摘要。
#[derive(Debug, Clone, Default)]
pub struct FlushAggregator {
    /// 按触发原因计数
    pub by_trigger: BTreeMap<String, u64>,
    /// 每批 item 数
    pub batch_items: RunningStats,
    /// 每批字节数
    pub batch_bytes: RunningStats,
}

impl FlushAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, trigger: &str, items: usize, bytes: usize) {
        *self.by_trigger.entry(trigger.to_string()).or_default() += 1;
        self.batch_items.push(items as f64);
        self.batch_bytes.push(bytes as f64);
    }

    pub fn total_flushes(&self) -> u64 {
        self.batch_items.count()
    }

    pub fn summary(&self) -> FlushSummary {
        FlushSummary {
            total_flushes: self.total_flushes(),
            by_trigger: self.by_trigger.clone(),
            batch_items: StatsSummary::from(&self.batch_items),
            batch_bytes: StatsSummary::from(&self.batch_bytes),
        }
    }
}

/// Flush 摘要
#[derive(Debug, Clone, Default)]
pub struct FlushSummary {
    pub total_flushes: u64,
    pub by_trigger: BTreeMap<String, u64>,
    pub batch_items: StatsSummary,
    pub batch_bytes: StatsSummary,
}

impl fmt::Display for FlushSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Flush Summary ===")?;
        writeln!(f, "Total flushes: {}", self.total_flushes)?;
        for (trigger, count) in &self.by_trigger {
            writeln!(f, "  {trigger}: {count}")?;
        }
        writeln!(f, "Items per batch: {}", self.batch_items)?;
        write!(f, "Bytes per batch: {}", self.batch_bytes)
    }
}

/// 统计摘要
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count(),
            min: stats.min(),
            max: stats.max(),
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.count == 0 {
            return write!(f, "n/a");
        }
        write!(
            f,
            "mean={:.1} min={:.0} max={:.0} std={:.1}",
            self.mean, self.min, self.max, self.std_dev
        )
    }
}

/// 在线统计 (Welford)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    pub fn push(&mut self, value: f64) {
        self.count += 1;
        if self.count == 1 {
            self.min = value;
            self.max = value;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);
        }

        let delta = value - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (value - self.mean);
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// 样本方差
    pub fn variance(&self) -> f64 {
        match self.count {
            0 | 1 => 0.0,
            n => self.m2 / (n - 1) as f64,
        }
    }

    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }
}
