//! Import orchestration.
//!
//! An import runs every node file in the given order, commits the remaining
//! staged nodes so that all ids are bound, then runs every relationship
//! file. There is no atomicity across batches: when an import fails, the
//! batches committed before the failure remain in the store.

use crate::batch::BatchCommitter;
use crate::config::{ImportConfig, ImportJob, NodeFile, RelationshipFile};
use crate::error::{ImportError, RowError, RowErrorLog};
use crate::header::FileKind;
use crate::metrics::MetricsCollector;
use crate::nodes::load_nodes;
use crate::reader::CsvFile;
use crate::relationships::load_relationships;
use graph_sink::GraphSink;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{error, info};

/// Number of row errors listed by the summary's `Display`.
const SHOWN_ROW_ERRORS: usize = 5;

/// Default number of row errors kept in full by [`ImportSummary`].
pub const DEFAULT_KEPT_ROW_ERRORS: usize = 1000;

/// Stage of an import call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportPhase {
    Init,
    LoadingNodes,
    LoadingRelationships,
    Flushing,
    Done,
    Failed,
}

impl fmt::Display for ImportPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ImportPhase::Init => "init",
            ImportPhase::LoadingNodes => "loading nodes",
            ImportPhase::LoadingRelationships => "loading relationships",
            ImportPhase::Flushing => "flushing",
            ImportPhase::Done => "done",
            ImportPhase::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Result of a completed import.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    /// Committed nodes
    pub nodes: u64,
    /// Committed relationships
    pub relationships: u64,
    /// Committed batches (store transactions)
    pub batches: u64,
    /// The first skipped or collapsed rows, up to the importer's limit
    #[serde(skip)]
    pub row_errors: Vec<RowError>,
    /// Number of row errors, including those not kept in `row_errors`
    pub row_error_count: u64,
}

impl fmt::Display for ImportSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} nodes, {} relationships in {} batches",
            self.nodes, self.relationships, self.batches
        )?;
        if self.row_error_count == 0 {
            return Ok(());
        }
        write!(f, "; {} row errors", self.row_error_count)?;
        let shown = self.row_errors.iter().take(SHOWN_ROW_ERRORS);
        let shown_count = shown.len() as u64;
        for row_error in shown {
            write!(f, "\n  {row_error}")?;
        }
        if self.row_error_count > shown_count {
            write!(f, "\n  ... and {} more", self.row_error_count - shown_count)?;
        }
        Ok(())
    }
}

/// Imports node and relationship files into a [`GraphSink`].
pub struct CsvImporter<'a, S: GraphSink> {
    sink: &'a S,
    config: ImportConfig,
    import_dir: Option<PathBuf>,
    metrics: Option<MetricsCollector>,
    row_error_limit: usize,
}

impl<'a, S: GraphSink> CsvImporter<'a, S> {
    pub fn new(sink: &'a S, config: ImportConfig) -> Self {
        Self {
            sink,
            config,
            import_dir: None,
            metrics: None,
            row_error_limit: DEFAULT_KEPT_ROW_ERRORS,
        }
    }

    /// Directory that `file:` URLs and relative file names resolve against.
    pub fn with_import_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.import_dir = Some(dir.into());
        self
    }

    pub fn with_metrics(mut self, metrics: MetricsCollector) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Number of row errors kept in full; all of them are still counted.
    pub fn with_row_error_limit(mut self, limit: usize) -> Self {
        self.row_error_limit = limit;
        self
    }

    pub fn config(&self) -> &ImportConfig {
        &self.config
    }

    /// Run one import call.
    pub async fn run(
        &self,
        node_files: &[NodeFile],
        relationship_files: &[RelationshipFile],
    ) -> Result<ImportSummary, ImportError> {
        let mut phase = ImportPhase::Init;
        info!(
            "Starting import of {} node files and {} relationship files",
            node_files.len(),
            relationship_files.len()
        );

        let result = self.run_phases(node_files, relationship_files, &mut phase).await;
        match &result {
            Ok(summary) => {
                transition(&mut phase, ImportPhase::Done);
                info!("Import finished: {summary}");
            }
            Err(e) => {
                error!("Import failed while {phase}: {e}");
                transition(&mut phase, ImportPhase::Failed);
            }
        }
        if let Some(metrics) = &self.metrics {
            if let Err(e) = metrics.emit().await {
                tracing::warn!("Failed to write final metrics: {e:#}");
            }
        }
        result
    }

    async fn run_phases(
        &self,
        node_files: &[NodeFile],
        relationship_files: &[RelationshipFile],
        phase: &mut ImportPhase,
    ) -> Result<ImportSummary, ImportError> {
        self.config.validate()?;
        let config = &self.config;
        let import_dir = self.import_dir.as_deref();
        let metrics = self.metrics.as_ref();

        let mut committer =
            BatchCommitter::new(self.sink, config.batch_size).with_metrics(metrics);
        let mut row_errors = RowErrorLog::new(self.row_error_limit);

        transition(phase, ImportPhase::LoadingNodes);
        for descriptor in node_files {
            let mut file =
                CsvFile::open(&descriptor.file_name, FileKind::Node, config, import_dir).await?;
            load_nodes(
                &mut file,
                descriptor,
                config,
                &mut committer,
                &mut row_errors,
                metrics,
            )
            .await?;
        }
        // Relationships resolve against bound ids only.
        committer.flush().await?;
        info!("Registered {} node ids", committer.registry().len());

        transition(phase, ImportPhase::LoadingRelationships);
        for descriptor in relationship_files {
            let mut file = CsvFile::open(
                &descriptor.file_name,
                FileKind::Relationship,
                config,
                import_dir,
            )
            .await?;
            load_relationships(
                &mut file,
                descriptor,
                config,
                &mut committer,
                &mut row_errors,
                metrics,
            )
            .await?;
        }

        transition(phase, ImportPhase::Flushing);
        committer.flush().await?;

        let totals = committer.totals();
        let (row_errors, row_error_count) = row_errors.into_parts();
        Ok(ImportSummary {
            nodes: totals.nodes,
            relationships: totals.relationships,
            batches: totals.batches,
            row_errors,
            row_error_count,
        })
    }
}

fn transition(phase: &mut ImportPhase, next: ImportPhase) {
    info!("Import phase: {} -> {}", phase, next);
    *phase = next;
}

/// Import node and relationship files with default settings for file
/// lookup and without metrics.
pub async fn import_csv<S: GraphSink>(
    sink: &S,
    node_files: &[NodeFile],
    relationship_files: &[RelationshipFile],
    config: ImportConfig,
) -> Result<ImportSummary, ImportError> {
    CsvImporter::new(sink, config)
        .run(node_files, relationship_files)
        .await
}

impl ImportJob {
    /// Run this job with the given importer settings.
    pub async fn run<S: GraphSink>(
        &self,
        sink: &S,
        import_dir: Option<&Path>,
        metrics: Option<MetricsCollector>,
    ) -> Result<ImportSummary, ImportError> {
        let mut importer = CsvImporter::new(sink, self.config.clone());
        if let Some(dir) = import_dir {
            importer = importer.with_import_dir(dir);
        }
        if let Some(metrics) = metrics {
            importer = importer.with_metrics(metrics);
        }
        importer.run(&self.nodes, &self.relationships).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Endpoint;
    use crate::header::IdSpace;

    fn unresolved(row: u64) -> RowError {
        RowError::UnresolvedIdentifier {
            file: "knows.csv".to_string(),
            row,
            endpoint: Endpoint::Start,
            space: IdSpace::Global,
            id: row.to_string(),
        }
    }

    #[test]
    fn test_summary_display_limits_row_errors() {
        let summary = ImportSummary {
            nodes: 2,
            relationships: 1,
            batches: 2,
            row_errors: (1..=7).map(unresolved).collect(),
            row_error_count: 7,
        };
        let text = summary.to_string();
        assert!(text.starts_with("2 nodes, 1 relationships in 2 batches; 7 row errors"));
        assert!(text.contains("knows.csv row 5"));
        assert!(!text.contains("knows.csv row 6"));
        assert!(text.ends_with("... and 2 more"));
    }

    #[test]
    fn test_summary_display_counts_errors_not_kept() {
        let summary = ImportSummary {
            nodes: 0,
            relationships: 0,
            batches: 0,
            row_errors: (1..=2).map(unresolved).collect(),
            row_error_count: 40,
        };
        let text = summary.to_string();
        assert!(text.contains("; 40 row errors"));
        assert!(text.ends_with("... and 38 more"));
    }

    #[test]
    fn test_summary_display_without_errors() {
        let summary = ImportSummary {
            nodes: 3,
            relationships: 0,
            batches: 1,
            row_errors: vec![],
            row_error_count: 0,
        };
        assert_eq!(summary.to_string(), "3 nodes, 0 relationships in 1 batches");
    }
}
