//! Progress metrics for import runs, emitted as JSON lines.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::io::AsyncWriteExt;

/// Shared import counters. Clones update the same counters.
#[derive(Clone)]
pub struct MetricsCollector {
    rows_read: Arc<AtomicU64>,
    nodes_committed: Arc<AtomicU64>,
    relationships_committed: Arc<AtomicU64>,
    batches_committed: Arc<AtomicU64>,
    row_errors: Arc<AtomicU64>,
    start_time: Instant,
    output_path: PathBuf,
}

/// Single metrics entry (one JSON line)
#[derive(Debug, Serialize, Deserialize)]
pub struct MetricsEntry {
    pub timestamp: String,
    pub rows_read: u64,
    pub nodes_committed: u64,
    pub relationships_committed: u64,
    pub batches_committed: u64,
    pub row_errors: u64,
    pub throughput_rows_per_sec: f64,
    pub memory_mb: u64,
    pub elapsed_secs: f64,
}

impl MetricsCollector {
    pub fn new(output_path: PathBuf) -> Self {
        Self {
            rows_read: Arc::new(AtomicU64::new(0)),
            nodes_committed: Arc::new(AtomicU64::new(0)),
            relationships_committed: Arc::new(AtomicU64::new(0)),
            batches_committed: Arc::new(AtomicU64::new(0)),
            row_errors: Arc::new(AtomicU64::new(0)),
            start_time: Instant::now(),
            output_path,
        }
    }

    pub fn add_rows(&self, count: u64) {
        self.rows_read.fetch_add(count, Ordering::Relaxed);
    }

    pub fn add_row_errors(&self, count: u64) {
        self.row_errors.fetch_add(count, Ordering::Relaxed);
    }

    /// Record one committed batch.
    pub fn add_batch(&self, nodes: u64, relationships: u64) {
        self.nodes_committed.fetch_add(nodes, Ordering::Relaxed);
        self.relationships_committed
            .fetch_add(relationships, Ordering::Relaxed);
        self.batches_committed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsEntry {
        let elapsed = self.start_time.elapsed().as_secs_f64();
        let rows = self.rows_read.load(Ordering::Relaxed);

        let throughput_rows = if elapsed > 0.0 {
            rows as f64 / elapsed
        } else {
            0.0
        };

        MetricsEntry {
            timestamp: chrono::Utc::now().to_rfc3339(),
            rows_read: rows,
            nodes_committed: self.nodes_committed.load(Ordering::Relaxed),
            relationships_committed: self.relationships_committed.load(Ordering::Relaxed),
            batches_committed: self.batches_committed.load(Ordering::Relaxed),
            row_errors: self.row_errors.load(Ordering::Relaxed),
            throughput_rows_per_sec: throughput_rows,
            memory_mb: resident_memory_mb(),
            elapsed_secs: elapsed,
        }
    }

    /// Append one snapshot to the output file.
    pub async fn emit(&self) -> Result<()> {
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.output_path)
            .await?;
        write_entry(&mut file, &self.snapshot()).await
    }

    /// Start background metrics emission task
    pub fn start_emission_task(&self, interval: Duration) -> tokio::task::JoinHandle<Result<()>> {
        let collector = self.clone();

        tokio::spawn(async move {
            let mut file = tokio::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&collector.output_path)
                .await?;

            let mut interval_timer = tokio::time::interval(interval);

            loop {
                interval_timer.tick().await;
                write_entry(&mut file, &collector.snapshot()).await?;
            }
        })
    }
}

/// Append one entry as a single write, so concurrent writers never split a line.
async fn write_entry(file: &mut tokio::fs::File, entry: &MetricsEntry) -> Result<()> {
    let mut json_line = serde_json::to_string(entry)?;
    json_line.push('\n');
    file.write_all(json_line.as_bytes()).await?;
    file.flush().await?;
    Ok(())
}

/// Resident set size from /proc/self/status; 0 where unavailable.
fn resident_memory_mb() -> u64 {
    std::fs::read_to_string("/proc/self/status")
        .ok()
        .and_then(|content| {
            content
                .lines()
                .find(|line| line.starts_with("VmRSS:"))
                .and_then(|line| {
                    line.split_whitespace()
                        .nth(1)
                        .and_then(|kb| kb.parse::<u64>().ok())
                        .map(|kb| kb / 1024)
                })
        })
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_counters_shared_between_clones() {
        let collector = MetricsCollector::new(PathBuf::from("/tmp/graph-import-metrics.jsonl"));
        let cloned = collector.clone();

        collector.add_rows(10);
        cloned.add_rows(5);
        cloned.add_batch(3, 2);
        collector.add_row_errors(1);

        let snapshot = collector.snapshot();
        assert_eq!(snapshot.rows_read, 15);
        assert_eq!(snapshot.nodes_committed, 3);
        assert_eq!(snapshot.relationships_committed, 2);
        assert_eq!(snapshot.batches_committed, 1);
        assert_eq!(snapshot.row_errors, 1);
        assert!(snapshot.throughput_rows_per_sec.is_finite());
    }

    #[test]
    fn test_snapshot_timestamp_format() {
        let collector = MetricsCollector::new(PathBuf::from("/tmp/graph-import-metrics.jsonl"));
        let snapshot = collector.snapshot();
        assert!(chrono::DateTime::parse_from_rfc3339(&snapshot.timestamp).is_ok());
    }

    #[tokio::test]
    async fn test_emit_appends_lines() {
        let temp_file = NamedTempFile::new().unwrap();
        let collector = MetricsCollector::new(temp_file.path().to_path_buf());

        collector.add_batch(2, 0);
        collector.emit().await.unwrap();
        collector.add_batch(0, 1);
        collector.emit().await.unwrap();

        let content = tokio::fs::read_to_string(temp_file.path()).await.unwrap();
        let entries: Vec<MetricsEntry> = content
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].nodes_committed, 2);
        assert_eq!(entries[1].relationships_committed, 1);
        assert_eq!(entries[1].batches_committed, 2);
    }

    #[tokio::test]
    async fn test_emission_task_writes_periodically() {
        let temp_file = NamedTempFile::new().unwrap();
        let collector = MetricsCollector::new(temp_file.path().to_path_buf());

        let handle = collector.start_emission_task(Duration::from_millis(30));
        tokio::time::sleep(Duration::from_millis(100)).await;
        handle.abort();

        let content = tokio::fs::read_to_string(temp_file.path()).await.unwrap();
        assert!(content.lines().count() >= 2);
    }

    #[tokio::test]
    async fn test_concurrent_writers_keep_lines_whole() {
        let temp_file = NamedTempFile::new().unwrap();
        let collector = MetricsCollector::new(temp_file.path().to_path_buf());

        let handle = collector.start_emission_task(Duration::from_millis(1));
        let writers: Vec<_> = (0..8)
            .map(|_| {
                let collector = collector.clone();
                tokio::spawn(async move {
                    for _ in 0..20 {
                        collector.add_rows(1);
                        collector.emit().await.unwrap();
                    }
                })
            })
            .collect();
        for writer in writers {
            writer.await.unwrap();
        }
        handle.abort();

        let content = tokio::fs::read_to_string(temp_file.path()).await.unwrap();
        assert!(content.ends_with('\n'));
        let mut emitted = 0;
        for line in content.lines() {
            let entry: MetricsEntry = serde_json::from_str(line)
                .unwrap_or_else(|e| panic!("torn metrics line {line:?}: {e}"));
            assert!(entry.rows_read <= 160);
            emitted += 1;
        }
        assert!(emitted >= 160);
    }
}
