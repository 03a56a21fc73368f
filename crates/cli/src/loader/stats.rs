//! Run statistics.

use std::time::Duration;

use indexer::StatsSnapshot;
use observability::FlushSummary;

use super::FeedProgress;

/// Statistics from one loader run
#[derive(Debug, Clone, Default)]
pub struct LoadStats {
    pub progress: FeedProgress,
    pub indexer: StatsSnapshot,
    pub flushes: FlushSummary,
    /// Wall time from first read to close
    pub duration: Duration,
}

impl LoadStats {
    /// Documents resolved per second
    pub fn docs_per_sec(&self) -> f64 {
        let secs = self.duration.as_secs_f64();
        if secs > 0.0 {
            (self.indexer.num_flushed + self.indexer.num_failed) as f64 / secs
        } else {
            0.0
        }
    }

    /// Failure rate among resolved items, as a percentage
    pub fn failure_rate(&self) -> f64 {
        let resolved = self.indexer.num_flushed + self.indexer.num_failed;
        if resolved > 0 {
            self.indexer.num_failed as f64 / resolved as f64 * 100.0
        } else {
            0.0
        }
    }

    /// Print detailed summary
    pub fn print_summary(&self) {
        println!();
        println!("Duration: {:.2}s", self.duration.as_secs_f64());
        println!(
            "Lines read: {} (skipped {})",
            self.progress.lines_read, self.progress.skipped_lines
        );
        if self.progress.interrupted {
            println!("Input interrupted before end of file");
        }
        println!("Throughput: {:.1} docs/s", self.docs_per_sec());
        println!("Failure rate: {:.2}%", self.failure_rate());
        println!();
        println!("{}", self.indexer);
        println!();
        println!("{}", self.flushes);
        println!();
    }
}
