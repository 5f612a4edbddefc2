//! Node file loading.

use crate::batch::{BatchCommitter, PendingNode};
use crate::coerce::{coerce_column, split_array};
use crate::config::{ImportConfig, NodeFile};
use crate::error::{ImportError, RowError, RowErrorLog};
use crate::header::{ColumnRole, Header};
use crate::metrics::MetricsCollector;
use crate::reader::CsvFile;
use crate::registry::{IdKey, Registration};
use csv::StringRecord;
use graph_sink::GraphSink;
use import_core::PropertyMap;
use tracing::{debug, info, warn};

/// Row counts for one loaded file.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FileStats {
    pub rows: u64,
    pub staged: u64,
    pub skipped: u64,
}

/// Build the node for one data row.
///
/// Labels are the file's static labels followed by the row's `:LABEL`
/// values, without duplicates. An `name:ID` column is also stored as the
/// property `name`.
pub(crate) fn build_node(
    file: &str,
    header: &Header,
    record: &StringRecord,
    row: u64,
    static_labels: &[String],
    config: &ImportConfig,
) -> Result<PendingNode, ImportError> {
    let mut labels: Vec<String> = Vec::with_capacity(static_labels.len());
    for label in static_labels {
        if !labels.contains(label) {
            labels.push(label.clone());
        }
    }
    let mut properties = PropertyMap::new();
    let mut key = None;

    for column in header.columns() {
        let raw = record.get(column.index).unwrap_or("");
        match &column.role {
            ColumnRole::Property => {
                if let Some(value) = coerce_column(file, row, column, raw, config)? {
                    properties.insert(column.name.clone(), value);
                }
            }
            ColumnRole::Id(space) => {
                if let Some(value) = coerce_column(file, row, column, raw, config)? {
                    key = Some(IdKey::from_value(space.clone(), &value, raw));
                    if !column.name.is_empty() {
                        properties.insert(column.name.clone(), value);
                    }
                }
            }
            ColumnRole::Label => {
                for label in split_array(raw, config) {
                    if !label.is_empty() && !labels.iter().any(|l| l == label) {
                        labels.push(label.to_string());
                    }
                }
            }
            ColumnRole::Ignore
            | ColumnRole::StartId(_)
            | ColumnRole::EndId(_)
            | ColumnRole::Type => {}
        }
    }

    Ok(PendingNode {
        key,
        labels,
        properties,
    })
}

/// Stage every row of a node file.
///
/// Rows repeating an id already seen in the same id space are dropped; the
/// first node wins. Unless `skipDuplicateNodes` is set they are reported as
/// [`RowError::DuplicateIdentifier`].
pub(crate) async fn load_nodes<S: GraphSink>(
    file: &mut CsvFile,
    descriptor: &NodeFile,
    config: &ImportConfig,
    committer: &mut BatchCommitter<'_, S>,
    row_errors: &mut RowErrorLog,
    metrics: Option<&MetricsCollector>,
) -> Result<FileStats, ImportError> {
    let mut stats = FileStats::default();
    let mut record = StringRecord::new();

    while let Some(row) = file.next_row(&mut record).await? {
        stats.rows += 1;
        if let Some(metrics) = metrics {
            metrics.add_rows(1);
        }

        let node = build_node(
            file.name(),
            file.header(),
            &record,
            row,
            &descriptor.labels,
            config,
        )?;

        if let Some(key) = &node.key {
            if let Registration::Duplicate { existing } = committer.registry_mut().register(key) {
                stats.skipped += 1;
                if config.skip_duplicate_nodes {
                    debug!("Skipping duplicate id '{}' at {} row {row}", key.id, file.name());
                } else {
                    warn!(
                        "Duplicate id '{}' in id space {} at {} row {row}, keeping {}",
                        key.id,
                        key.space,
                        file.name(),
                        existing.map_or_else(|| "the first node".to_string(), |h| h.to_string())
                    );
                    row_errors.push(RowError::DuplicateIdentifier {
                        file: file.name().to_string(),
                        row,
                        space: key.space.clone(),
                        id: key.id.clone(),
                    });
                    if let Some(metrics) = metrics {
                        metrics.add_row_errors(1);
                    }
                }
                continue;
            }
        }

        committer.stage_node(node).await?;
        stats.staged += 1;
    }

    info!(
        "Loaded {} nodes from {} ({} rows, {} duplicates skipped)",
        stats.staged,
        file.name(),
        stats.rows,
        stats.skipped
    );
    Ok(stats)
}
