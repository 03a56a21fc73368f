//! Input loading: NDJSON file -> bulk indexer.

mod source;
mod stats;

pub use source::LineParser;
pub use stats::LoadStats;

use std::path::Path;

use indexer::{BulkIndexer, IndexerError};
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::{CliError, Result};

/// Counters for one pass over the input
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeedProgress {
    pub lines_read: usize,
    pub items_added: usize,
    pub skipped_lines: usize,
    /// Input stopped early because `cancel` fired
    pub interrupted: bool,
}

/// Feed every line of `path` to the indexer
///
/// Blank lines are skipped; a malformed line aborts the run. Stops early,
/// without error, when `cancel` fires.
pub async fn feed_file(
    indexer: &BulkIndexer,
    path: &Path,
    parser: &LineParser,
    cancel: &CancellationToken,
) -> Result<FeedProgress> {
    let file = File::open(path).await?;
    let mut lines = BufReader::new(file).lines();
    let mut progress = FeedProgress::default();

    while let Some(line) = lines.next_line().await? {
        progress.lines_read += 1;

        let Some(item) = parser.parse(progress.lines_read, &line)? else {
            progress.skipped_lines += 1;
            continue;
        };

        match indexer.add(item, cancel).await {
            Ok(()) => progress.items_added += 1,
            Err(IndexerError::Cancelled) => {
                warn!(line = progress.lines_read, "Input interrupted");
                progress.interrupted = true;
                break;
            }
            Err(IndexerError::InvalidItem(e)) => {
                return Err(CliError::invalid_input(progress.lines_read, e.to_string()));
            }
            Err(e) => return Err(e.into()),
        }
    }

    debug!(?progress, "Input exhausted");
    Ok(progress)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use contracts::{Action, BulkRequest, ContractError};
    use indexer::flush_fn;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn echo_indexer() -> BulkIndexer {
        BulkIndexer::builder(flush_fn(|request: BulkRequest| async move {
            let items = vec![r#"{"index":{"status":201,"result":"created"}}"#; request.item_count];
            Ok::<_, ContractError>(Bytes::from(format!(
                r#"{{"items":[{}]}}"#,
                items.join(",")
            )))
        }))
        .workers(2)
        .build()
    }

    #[tokio::test]
    async fn test_feed_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"id":"a","n":1}}"#).unwrap();
        writeln!(file).unwrap();
        writeln!(file, r#"{{"id":"b","n":2}}"#).unwrap();

        let indexer = echo_indexer();
        let parser = LineParser::new(Action::Index, Some("id".to_string()));
        let cancel = CancellationToken::new();

        let progress = feed_file(&indexer, file.path(), &parser, &cancel)
            .await
            .unwrap();
        indexer.close(&cancel).await.unwrap();

        assert_eq!(progress.lines_read, 3);
        assert_eq!(progress.items_added, 2);
        assert_eq!(progress.skipped_lines, 1);
        assert!(!progress.interrupted);
        assert_eq!(indexer.stats().num_created, 2);
    }

    #[tokio::test]
    async fn test_malformed_line_reports_position() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"id":"a"}}"#).unwrap();
        writeln!(file, "not json").unwrap();

        let indexer = echo_indexer();
        let parser = LineParser::new(Action::Delete, Some("id".to_string()));
        let cancel = CancellationToken::new();

        let err = feed_file(&indexer, file.path(), &parser, &cancel)
            .await
            .unwrap_err();
        assert!(matches!(err, CliError::InvalidInput { line: 2, .. }));
        indexer.close(&cancel).await.unwrap();
    }

    #[tokio::test]
    async fn test_missing_file() {
        let indexer = echo_indexer();
        let parser = LineParser::new(Action::Index, None);
        let cancel = CancellationToken::new();

        let err = feed_file(&indexer, Path::new("/nonexistent/input.ndjson"), &parser, &cancel)
            .await
            .unwrap_err();
        assert!(matches!(err, CliError::Io(_)));
        indexer.close(&cancel).await.unwrap();
    }
}
